use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::{redacted_message, CoreError};
use crate::models::quote::{DailyChange, SpotChange, SpotQuote};
use super::traits::{checked_price, SpotPriceSource};

const PROVIDER: &str = "stack-tracker-api";

/// The Stack Tracker backend: `GET {base}/api/spot-prices`.
///
/// - **No API key** required.
/// - Returns both metals in one call, with optional daily change data.
pub struct StackApiSource {
    client: Client,
    url: String,
}

impl StackApiSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            url: format!("{}/api/spot-prices", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decode a `/api/spot-prices` body.
///
/// Shape:
/// ```text
/// { success: bool, silver: number, gold: number, timestamp?: string, source?: string,
///   change?: { gold?: {amount?, percent?}, silver?: {amount?, percent?} } }
/// ```
/// `success` other than `true`, or a missing/non-numeric price, is an error.
/// Absent change fields are `None`, never zero.
pub fn parse_spot_response(body: &Value) -> Result<SpotQuote, CoreError> {
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(CoreError::Api {
            provider: PROVIDER.into(),
            message: "Response did not report success".into(),
        });
    }

    let silver = checked_price(PROVIDER, "silver", body.get("silver").and_then(Value::as_f64))?;
    let gold = checked_price(PROVIDER, "gold", body.get("gold").and_then(Value::as_f64))?;

    let change = body.get("change");
    let daily = |metal: &str| {
        let entry = change.and_then(|c| c.get(metal));
        DailyChange {
            amount: entry.and_then(|e| e.get("amount")).and_then(Value::as_f64),
            percent: entry.and_then(|e| e.get("percent")).and_then(Value::as_f64),
        }
    };

    Ok(SpotQuote {
        silver,
        gold,
        timestamp: body.get("timestamp").and_then(Value::as_str).map(str::to_string),
        source: body.get("source").and_then(Value::as_str).map(str::to_string),
        change: SpotChange {
            silver: daily("silver"),
            gold: daily("gold"),
        },
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SpotPriceSource for StackApiSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_quote(&self) -> Result<SpotQuote, CoreError> {
        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse spot prices: {}", redacted_message(&e)),
            })?;

        parse_spot_response(&body)
    }
}
