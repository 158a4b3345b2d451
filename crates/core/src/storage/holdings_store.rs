use std::collections::HashSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::draft::{DEFAULT_OZT_PER_UNIT, DEFAULT_QUANTITY, DEFAULT_UNIT_PRICE};
use crate::models::holding::{Holding, HoldingId, Metal};
use crate::models::portfolio::Portfolio;

use super::traits::KeyValueStore;

/// Store key of the silver collection.
pub const SILVER_KEY: &str = "stack_silver_holdings";
/// Store key of the gold collection.
pub const GOLD_KEY: &str = "stack_gold_holdings";

/// Each metal is persisted under its own key, so a failed write of one
/// collection never touches the other.
pub fn storage_key(metal: Metal) -> &'static str {
    match metal {
        Metal::Silver => SILVER_KEY,
        Metal::Gold => GOLD_KEY,
    }
}

/// A collection that could not be written. The in-memory change stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistWarning {
    pub metal: Metal,
    pub message: String,
}

impl std::fmt::Display for PersistWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to save {} holdings: {}", self.metal, self.message)
    }
}

/// Result of a mutation: the portfolio after the change plus any persistence
/// warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreUpdate {
    pub portfolio: Portfolio,
    pub warnings: Vec<PersistWarning>,
}

impl StoreUpdate {
    pub fn is_persisted(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Owns the portfolio and keeps it in sync with the key-value store.
///
/// One repository for both metals: the metal is only a partition key.
/// Every mutation writes both collections back, in call order.
///
/// A collection whose entry could not be *read* (I/O or decryption error,
/// as opposed to unparsable data) is held back from writes, so the stored
/// bytes survive until a read succeeds or that metal is changed.
pub struct HoldingsStore<S> {
    store: S,
    portfolio: Portfolio,
    unread: HashSet<Metal>,
}

impl<S: KeyValueStore> HoldingsStore<S> {
    /// Restore the portfolio from `store`.
    ///
    /// Missing, unreadable or corrupt entries yield an empty collection for
    /// that metal; loading itself never fails.
    pub fn load(store: S) -> Self {
        let (portfolio, unread) = read_portfolio(&store);
        info!(
            "loaded {} silver and {} gold holdings",
            portfolio.silver.len(),
            portfolio.gold.len()
        );
        Self {
            store,
            portfolio,
            unread,
        }
    }

    /// Discard in-memory state and read both collections again.
    pub fn reload(&mut self) -> &Portfolio {
        let (portfolio, unread) = read_portfolio(&self.store);
        self.portfolio = portfolio;
        self.unread = unread;
        &self.portfolio
    }

    /// Metals whose stored entry could not be read and is not being written.
    pub fn unread_metals(&self) -> Vec<Metal> {
        Metal::ALL
            .into_iter()
            .filter(|m| self.unread.contains(m))
            .collect()
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn list(&self, metal: Metal) -> &[Holding] {
        self.portfolio.holdings(metal)
    }

    pub fn get(&self, id: &HoldingId, metal: Metal) -> Option<&Holding> {
        self.portfolio.find(id, metal)
    }

    /// Append a holding to its metal's collection. A fresh id is assigned if
    /// the holding has none or its id is already taken.
    pub fn create(&mut self, mut holding: Holding) -> StoreUpdate {
        self.claim(holding.metal);
        if holding.id.is_unassigned() || self.portfolio.metal_of(&holding.id).is_some() {
            holding.id = HoldingId::generate();
        }
        debug!("creating {} holding {}", holding.metal, holding.id);
        self.portfolio.holdings_mut(holding.metal).push(holding);
        self.persist()
    }

    /// Replace the holding with the same id in the same metal's collection.
    ///
    /// Unknown ids are a no-op. An id that lives in the other metal's
    /// collection is rejected: a holding never changes metal in place.
    pub fn update(&mut self, holding: Holding) -> Result<StoreUpdate, CoreError> {
        let metal = holding.metal;
        self.claim(metal);
        let position = self
            .portfolio
            .holdings(metal)
            .iter()
            .position(|h| h.id == holding.id);
        match position {
            Some(idx) => {
                debug!("updating {metal} holding {}", holding.id);
                self.portfolio.holdings_mut(metal)[idx] = holding;
            }
            None => {
                if let Some(actual) = self.portfolio.metal_of(&holding.id) {
                    return Err(CoreError::MetalImmutable {
                        id: holding.id.to_string(),
                        actual,
                        requested: holding.metal,
                    });
                }
                debug!("update of unknown holding {} ignored", holding.id);
            }
        }
        Ok(self.persist())
    }

    /// Remove a holding. Deleting an absent id is a no-op.
    pub fn delete(&mut self, id: &HoldingId, metal: Metal) -> StoreUpdate {
        self.claim(metal);
        self.portfolio.holdings_mut(metal).retain(|h| &h.id != id);
        self.persist()
    }

    /// Before changing a collection that failed to read, try the read once
    /// more and keep what it finds. Either way the collection is written from
    /// now on: the caller is changing it.
    fn claim(&mut self, metal: Metal) {
        if !self.unread.remove(&metal) {
            return;
        }
        match read_collection(&self.store, metal) {
            Ok(stored) => {
                info!("{metal} holdings readable again, recovered {}", stored.len());
                let current = std::mem::take(self.portfolio.holdings_mut(metal));
                let mut merged = Vec::with_capacity(stored.len() + current.len());
                for holding in stored {
                    if holding.metal == metal {
                        merged.push(holding);
                    } else if self.portfolio.find(&holding.id, holding.metal).is_none() {
                        self.portfolio.holdings_mut(holding.metal).push(holding);
                    }
                }
                for holding in current {
                    if !merged.iter().any(|h| h.id == holding.id) {
                        merged.push(holding);
                    }
                }
                *self.portfolio.holdings_mut(metal) = merged;
            }
            Err(e) => {
                warn!("{metal} holdings still unreadable, overwriting on change: {e}");
            }
        }
    }

    /// Write both collections, each as its own entry. Collections that
    /// could not be read are skipped and reported.
    fn persist(&mut self) -> StoreUpdate {
        let mut warnings = Vec::new();
        for metal in Metal::ALL {
            if self.unread.contains(&metal) {
                debug!("not writing {metal} holdings: stored entry was unreadable");
                warnings.push(PersistWarning {
                    metal,
                    message: "stored entry could not be read, left unchanged".into(),
                });
                continue;
            }
            if let Err(e) = write_collection(&mut self.store, metal, self.portfolio.holdings(metal)) {
                warn!("failed to persist {metal} holdings: {e}");
                warnings.push(PersistWarning {
                    metal,
                    message: e.to_string(),
                });
            }
        }
        StoreUpdate {
            portfolio: self.portfolio.clone(),
            warnings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

fn read_portfolio<S: KeyValueStore + ?Sized>(store: &S) -> (Portfolio, HashSet<Metal>) {
    let mut portfolio = Portfolio::new();
    let mut unread = HashSet::new();
    for metal in Metal::ALL {
        let holdings = match read_collection(store, metal) {
            Ok(holdings) => holdings,
            Err(e) => {
                warn!("failed to read {metal} holdings, starting empty: {e}");
                unread.insert(metal);
                continue;
            }
        };
        for holding in holdings {
            // A record filed under the wrong key still belongs to its own metal.
            if holding.metal != metal {
                warn!(
                    "holding {} stored under {} is {}; moving it",
                    holding.id,
                    storage_key(metal),
                    holding.metal
                );
            }
            portfolio.holdings_mut(holding.metal).push(holding);
        }
    }
    (portfolio, unread)
}

/// Read one metal's entry. Only a failed `get` is an error; unparsable
/// content yields whatever records could be salvaged.
fn read_collection<S: KeyValueStore + ?Sized>(
    store: &S,
    metal: Metal,
) -> Result<Vec<Holding>, CoreError> {
    let Some(bytes) = store.get(storage_key(metal))? else {
        return Ok(Vec::new());
    };
    let records: Vec<Value> = match serde_json::from_slice(&bytes) {
        Ok(records) => records,
        Err(e) => {
            warn!("stored {metal} holdings are not a JSON array, starting empty: {e}");
            return Ok(Vec::new());
        }
    };
    Ok(records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| parse_record(metal, idx, record))
        .collect())
}

fn parse_record(metal: Metal, idx: usize, mut record: Value) -> Option<Holding> {
    if repair_numbers(&mut record) {
        warn!("{metal} holding #{idx} had invalid numbers, replaced with defaults");
    }
    match serde_json::from_value::<Holding>(record) {
        Ok(holding) => Some(holding),
        Err(e) => {
            warn!("skipping unreadable {metal} holding #{idx}: {e}");
            None
        }
    }
}

/// Apply the form fallbacks to numeric fields older versions could store
/// out of range (e.g. a negative quantity or a numeric string). Returns
/// whether any field was replaced.
fn repair_numbers(record: &mut Value) -> bool {
    let Some(fields) = record.as_object_mut() else {
        return false;
    };
    let number = |v: Option<&Value>| -> Option<f64> {
        let n: Option<f64> = match v? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    };
    let mut repaired = false;

    let ozt_key = if fields.contains_key("ozt") { "ozt" } else { "oztPerUnit" };
    let ozt_ok = fields.get(ozt_key).and_then(Value::as_f64).is_some_and(|v| v > 0.0);
    if !ozt_ok {
        let ozt = number(fields.get(ozt_key))
            .filter(|v| *v > 0.0)
            .unwrap_or(DEFAULT_OZT_PER_UNIT);
        fields.insert(ozt_key.into(), Value::from(ozt));
        repaired = true;
    }

    let quantity_ok = fields
        .get("quantity")
        .and_then(Value::as_u64)
        .is_some_and(|q| q >= 1 && q <= u64::from(u32::MAX));
    if !quantity_ok {
        let quantity = number(fields.get("quantity"))
            .filter(|v| *v >= 1.0 && *v <= f64::from(u32::MAX))
            .map(|v| v.trunc() as u32)
            .unwrap_or(DEFAULT_QUANTITY);
        fields.insert("quantity".into(), Value::from(quantity));
        repaired = true;
    }

    let price_ok = fields
        .get("unitPrice")
        .and_then(Value::as_f64)
        .is_some_and(|p| p >= 0.0);
    if !price_ok {
        let unit_price = number(fields.get("unitPrice"))
            .filter(|v| *v >= 0.0)
            .unwrap_or(DEFAULT_UNIT_PRICE);
        fields.insert("unitPrice".into(), Value::from(unit_price));
        repaired = true;
    }

    repaired
}

fn write_collection<S: KeyValueStore + ?Sized>(
    store: &mut S,
    metal: Metal,
    holdings: &[Holding],
) -> Result<(), CoreError> {
    let bytes = serde_json::to_vec(holdings)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize {metal} holdings: {e}")))?;
    store.set(storage_key(metal), &bytes)
}
