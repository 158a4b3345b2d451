use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::SpotQuote;

/// A remote source of silver and gold spot prices.
///
/// Implementations only fetch and decode. They must return an error rather
/// than a quote with a missing or non-finite price for either metal;
/// keeping the previous quote on failure is the caller's job.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SpotPriceSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the latest silver and gold spot prices in USD per troy ounce.
    async fn fetch_quote(&self) -> Result<SpotQuote, CoreError>;
}

/// Accept only finite, strictly positive prices.
pub(crate) fn checked_price(provider: &str, metal: &str, value: Option<f64>) -> Result<f64, CoreError> {
    match value {
        Some(price) if price.is_finite() && price > 0.0 => Ok(price),
        Some(price) => Err(CoreError::Api {
            provider: provider.to_string(),
            message: format!("Invalid {metal} price: {price}"),
        }),
        None => Err(CoreError::Api {
            provider: provider.to_string(),
            message: format!("Missing or non-numeric {metal} price"),
        }),
    }
}
