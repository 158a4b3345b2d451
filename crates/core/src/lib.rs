pub mod display;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use chrono::NaiveDate;
use models::{
    draft::{DraftField, FormDraft},
    holding::{Holding, HoldingId, Metal},
    portfolio::Portfolio,
    quote::SpotQuote,
    settings::Settings,
    valuation::{DashboardView, HoldingsView, ValuationSummary},
};
use providers::registry::SpotSourceRegistry;
use services::{
    holding_workflow::{FormState, HoldingWorkflow},
    spot_price_service::{FetchOutcome, FetchTicket, SpotPriceService},
    valuation_service::ValuationService,
};
use storage::holdings_store::{HoldingsStore, StoreUpdate};
use storage::traits::KeyValueStore;

use errors::CoreError;

/// Upper bound for the dashboard's recent-holdings list.
const MAX_RECENT_HOLDINGS: usize = 100;

/// Main entry point for the Stack Tracker core library.
///
/// Owns the holdings (restored from the key-value store on open), the last
/// known spot quote and the add/edit form. All holding writes go through
/// the form workflow; valuations are recomputed on every call.
#[must_use]
pub struct StackTracker<S: KeyValueStore> {
    holdings: HoldingsStore<S>,
    workflow: HoldingWorkflow,
    spot_service: SpotPriceService,
    valuation_service: ValuationService,
    settings: Settings,
}

impl<S: KeyValueStore> std::fmt::Debug for StackTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let portfolio = self.holdings.portfolio();
        f.debug_struct("StackTracker")
            .field("silver_holdings", &portfolio.silver.len())
            .field("gold_holdings", &portfolio.gold.len())
            .field("spot", self.spot_service.current_quote())
            .field("form", self.workflow.state())
            .finish()
    }
}

impl<S: KeyValueStore> StackTracker<S> {
    /// Restore settings and holdings from `store` and set up the spot sources
    /// the settings call for. Never fails: unreadable data loads as empty.
    pub fn open(store: S) -> Self {
        let settings = storage::settings::load_settings(&store);
        let registry = SpotSourceRegistry::new_with_defaults(&settings);
        Self::build(store, settings, registry)
    }

    /// Like [`open`](Self::open), but with caller-supplied spot sources.
    pub fn open_with_registry(store: S, registry: SpotSourceRegistry) -> Self {
        let settings = storage::settings::load_settings(&store);
        Self::build(store, settings, registry)
    }

    fn build(store: S, settings: Settings, registry: SpotSourceRegistry) -> Self {
        Self {
            holdings: HoldingsStore::load(store),
            workflow: HoldingWorkflow::new(settings.default_metal),
            spot_service: SpotPriceService::new(registry),
            valuation_service: ValuationService::new(),
            settings,
        }
    }

    // ── Spot Prices ─────────────────────────────────────────────────

    /// Fetch spot prices. On failure the previous quote is kept and the
    /// outcome says why; this never returns an error.
    ///
    /// Borrows the tracker for the whole request. Callers that must keep
    /// editing holdings while a fetch is in flight use
    /// [`begin_spot_fetch`](Self::begin_spot_fetch) and
    /// [`complete_spot_fetch`](Self::complete_spot_fetch) instead.
    pub async fn refresh_spot_prices(&mut self) -> FetchOutcome {
        self.spot_service.refresh().await
    }

    /// Start a fetch without holding the tracker: returns the ticket and the
    /// sources to await. Hand the result back to `complete_spot_fetch`.
    ///
    /// ```ignore
    /// let (ticket, sources) = tracker.begin_spot_fetch();
    /// let result = sources.fetch_quote().await; // tracker stays usable
    /// tracker.complete_spot_fetch(ticket, result);
    /// ```
    pub fn begin_spot_fetch(&mut self) -> (FetchTicket, Arc<SpotSourceRegistry>) {
        (self.spot_service.begin_fetch(), self.spot_service.registry())
    }

    /// Apply a fetch started with `begin_spot_fetch`. Results older than an
    /// already applied fetch are dropped.
    pub fn complete_spot_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<SpotQuote, CoreError>,
    ) -> FetchOutcome {
        self.spot_service.complete_fetch(ticket, result)
    }

    /// Last successfully fetched quote (zero prices before the first success).
    #[must_use]
    pub fn spot_quote(&self) -> &SpotQuote {
        self.spot_service.current_quote()
    }

    /// Direct access for callers that run fetches concurrently
    /// (`begin_fetch` / `complete_fetch`).
    pub fn spot_service_mut(&mut self) -> &mut SpotPriceService {
        &mut self.spot_service
    }

    // ── Holdings (read) ─────────────────────────────────────────────

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        self.holdings.portfolio()
    }

    #[must_use]
    pub fn holdings(&self, metal: Metal) -> &[Holding] {
        self.holdings.list(metal)
    }

    #[must_use]
    pub fn get_holding(&self, id: &HoldingId, metal: Metal) -> Option<&Holding> {
        self.holdings.get(id, metal)
    }

    // ── Valuation ───────────────────────────────────────────────────

    #[must_use]
    pub fn valuation(&self) -> ValuationSummary {
        self.valuation_service
            .summarize(self.holdings.portfolio(), self.spot_quote())
    }

    /// Spot prices, daily changes, totals and the most recent purchases.
    #[must_use]
    pub fn dashboard(&self) -> DashboardView {
        self.valuation_service.dashboard(
            self.holdings.portfolio(),
            self.spot_quote(),
            self.settings.recent_holdings_limit,
        )
    }

    /// All holdings grouped by metal, each with its melt value at current spot.
    #[must_use]
    pub fn holdings_view(&self) -> HoldingsView {
        self.valuation_service
            .holdings_view(self.holdings.portfolio(), self.spot_quote())
    }

    // ── Holding Form ────────────────────────────────────────────────

    #[must_use]
    pub fn form_state(&self) -> &FormState {
        self.workflow.state()
    }

    pub fn open_new_holding_form(&mut self) -> Result<&FormDraft, CoreError> {
        self.workflow.open_create(today())
    }

    pub fn open_edit_holding_form(
        &mut self,
        id: &HoldingId,
        metal: Metal,
    ) -> Result<&FormDraft, CoreError> {
        self.workflow.open_edit(&self.holdings, id, metal)
    }

    pub fn set_form_field(&mut self, field: DraftField) -> Result<(), CoreError> {
        self.workflow.update_field(field)
    }

    /// Set a form field from raw text input, e.g. `("quantity", "10")`.
    pub fn set_form_input(&mut self, name: &str, raw: &str) -> Result<(), CoreError> {
        let field = DraftField::from_input(name, raw)?;
        self.workflow.update_field(field)
    }

    /// Save the open form. Validation errors leave the form open; save
    /// failures are reported as warnings in the result.
    pub fn commit_form(&mut self) -> Result<StoreUpdate, CoreError> {
        self.workflow.commit(&mut self.holdings, today())
    }

    pub fn cancel_form(&mut self) -> bool {
        self.workflow.cancel()
    }

    /// Delete a holding. Deleting an unknown id is a no-op.
    pub fn delete_holding(&mut self, id: &HoldingId, metal: Metal) -> StoreUpdate {
        self.workflow.delete(&mut self.holdings, id, metal)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate, persist and apply new settings. Spot sources are rebuilt so
    /// a new endpoint or API key takes effect on the next refresh.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        validate_settings(&settings)?;
        storage::settings::save_settings(self.holdings.store_mut(), &settings)?;
        self.spot_service
            .set_registry(SpotSourceRegistry::new_with_defaults(&settings));
        self.workflow.set_default_metal(settings.default_metal);
        self.settings = settings;
        Ok(())
    }

    /// Give back the underlying store (e.g. to close a file).
    pub fn into_store(self) -> S {
        self.holdings.into_store()
    }
}

fn validate_settings(settings: &Settings) -> Result<(), CoreError> {
    let url = settings.api_base_url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(CoreError::ValidationError(format!(
            "Invalid API base URL '{url}': must start with http:// or https://"
        )));
    }
    if settings.request_timeout_secs == 0 {
        return Err(CoreError::ValidationError(
            "Request timeout must be at least 1 second".into(),
        ));
    }
    if settings.recent_holdings_limit > MAX_RECENT_HOLDINGS {
        return Err(CoreError::ValidationError(format!(
            "Recent holdings limit {} exceeds maximum of {MAX_RECENT_HOLDINGS}",
            settings.recent_holdings_limit
        )));
    }
    Ok(())
}

/// Purchase dates are calendar days in the user's local time zone.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
