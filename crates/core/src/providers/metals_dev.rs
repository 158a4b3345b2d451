use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::{redacted_message, CoreError};
use crate::models::quote::SpotQuote;
use super::traits::{checked_price, SpotPriceSource};

const BASE_URL: &str = "https://api.metals.dev/v1";
const PROVIDER: &str = "metals.dev";

/// metals.dev spot prices, used as a fallback source.
///
/// - **Free tier**: 100 requests/month.
/// - **Requires**: API key (`Settings::metals_dev_api_key`).
/// - Reports no daily change, so the quote's change fields stay `None`.
pub struct MetalsDevSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MetalsDevSource {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, BASE_URL, timeout_secs)
    }

    /// Point the source at another host serving the same `/latest` API.
    pub fn with_base_url(api_key: String, base_url: &str, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

// ── metals.dev API response types ───────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LatestResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metals: HashMap<String, f64>,
    #[serde(default)]
    pub timestamps: HashMap<String, String>,
}

/// Turn a `/latest` response (USD, troy ounces) into a quote.
pub fn quote_from_latest(resp: &LatestResponse) -> Result<SpotQuote, CoreError> {
    if let Some(status) = resp.status.as_deref() {
        if status != "success" {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Request failed with status '{status}'"),
            });
        }
    }

    let silver = checked_price(PROVIDER, "silver", resp.metals.get("silver").copied())?;
    let gold = checked_price(PROVIDER, "gold", resp.metals.get("gold").copied())?;

    let mut quote = SpotQuote::new(silver, gold);
    quote.timestamp = resp.timestamps.get("metal").cloned();
    quote.source = Some(PROVIDER.to_string());
    Ok(quote)
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SpotPriceSource for MetalsDevSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_quote(&self) -> Result<SpotQuote, CoreError> {
        let url = format!("{}/latest", self.base_url);

        let resp: LatestResponse = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("currency", "USD"),
                ("unit", "toz"),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse latest prices: {}", redacted_message(&e)),
            })?;

        quote_from_latest(&resp)
    }
}
