use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::quote::SpotQuote;
use crate::models::settings::Settings;

use super::metals_dev::MetalsDevSource;
use super::stack_api::StackApiSource;
use super::traits::SpotPriceSource;

/// Ordered list of spot price sources. Earlier sources have priority;
/// later ones are fallbacks.
pub struct SpotSourceRegistry {
    sources: Vec<Box<dyn SpotPriceSource>>,
}

impl SpotSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registry built from settings: the Stack Tracker API first, then
    /// metals.dev when an API key is configured.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(StackApiSource::new(
            &settings.api_base_url,
            settings.request_timeout_secs,
        )));

        if let Some(key) = settings
            .metals_dev_api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
        {
            registry.register(Box::new(MetalsDevSource::new(
                key.clone(),
                settings.request_timeout_secs,
            )));
        }

        registry
    }

    pub fn register(&mut self, source: Box<dyn SpotPriceSource>) {
        self.sources.push(source);
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Ask each source in order; the first valid quote wins.
    /// Returns the last error when every source fails.
    pub async fn fetch_quote(&self) -> Result<SpotQuote, CoreError> {
        let mut last_error = None;

        for source in &self.sources {
            match source.fetch_quote().await {
                Ok(quote) => {
                    // Sources should already reject these; a custom source might not.
                    if !(quote.silver.is_finite() && quote.silver > 0.0)
                        || !(quote.gold.is_finite() && quote.gold > 0.0)
                    {
                        warn!("{} returned invalid spot prices, skipping", source.name());
                        last_error = Some(CoreError::Api {
                            provider: source.name().to_string(),
                            message: format!(
                                "Invalid spot prices: silver={}, gold={}",
                                quote.silver, quote.gold
                            ),
                        });
                        continue;
                    }
                    debug!("spot prices from {}", source.name());
                    return Ok(quote);
                }
                Err(e) => {
                    warn!("spot price source {} failed: {e}", source.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}

impl Default for SpotSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
