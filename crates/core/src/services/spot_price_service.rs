use std::sync::Arc;

use log::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::quote::SpotQuote;
use crate::providers::registry::SpotSourceRegistry;

/// Sequence number handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// What happened to the current quote when a fetch completed.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The fetched quote replaced the current one.
    Updated,
    /// The fetch failed; the previous quote was kept.
    Retained { error: String },
    /// A fetch started later had already been applied; this result was dropped.
    Superseded,
}

/// Keeps the last good spot quote and applies fetch results in request order.
///
/// Fetches may overlap: each one takes a [`FetchTicket`] when it starts, and a
/// result is only applied if no later-started fetch has been applied already.
/// Failures never touch the current quote, which starts out as zero prices.
pub struct SpotPriceService {
    registry: Arc<SpotSourceRegistry>,
    current: SpotQuote,
    issued: u64,
    applied: u64,
    last_error: Option<String>,
}

impl SpotPriceService {
    pub fn new(registry: SpotSourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            current: SpotQuote::default(),
            issued: 0,
            applied: 0,
            last_error: None,
        }
    }

    /// Swap the sources (e.g. after settings changed). The current quote stays,
    /// and fetches started before the swap can still complete.
    pub fn set_registry(&mut self, registry: SpotSourceRegistry) {
        self.registry = Arc::new(registry);
    }

    /// Shared handle to the sources, for running a fetch outside `&mut self`.
    pub fn registry(&self) -> Arc<SpotSourceRegistry> {
        Arc::clone(&self.registry)
    }

    /// The last successfully fetched quote, or zero prices if none yet.
    pub fn current_quote(&self) -> &SpotQuote {
        &self.current
    }

    /// Error message of the most recent failed fetch, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Mark the start of a fetch.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Apply the result of the fetch started with `ticket`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<SpotQuote, CoreError>,
    ) -> FetchOutcome {
        match result {
            Ok(quote) => {
                if ticket.0 <= self.applied {
                    debug!(
                        "dropping spot quote from fetch #{}: fetch #{} already applied",
                        ticket.0, self.applied
                    );
                    return FetchOutcome::Superseded;
                }
                info!(
                    "spot prices updated: silver={} gold={} source={}",
                    quote.silver,
                    quote.gold,
                    quote.source.as_deref().unwrap_or("unknown")
                );
                self.applied = ticket.0;
                self.current = quote;
                self.last_error = None;
                FetchOutcome::Updated
            }
            Err(e) => {
                warn!("failed to fetch spot prices, keeping previous quote: {e}");
                let error = e.to_string();
                self.last_error = Some(error.clone());
                FetchOutcome::Retained { error }
            }
        }
    }

    /// Fetch once from the registered sources and apply the result.
    pub async fn refresh(&mut self) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let registry = self.registry();
        let result = registry.fetch_quote().await;
        self.complete_fetch(ticket, result)
    }
}
