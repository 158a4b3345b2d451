use serde::{Deserialize, Serialize};

use super::holding::{Holding, HoldingId, Metal};

/// All holdings, partitioned by metal.
///
/// Each collection keeps insertion order. Display order (e.g. newest first)
/// is derived by the views, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub silver: Vec<Holding>,
    pub gold: Vec<Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holdings of one metal, in insertion order.
    pub fn holdings(&self, metal: Metal) -> &[Holding] {
        match metal {
            Metal::Silver => &self.silver,
            Metal::Gold => &self.gold,
        }
    }

    pub(crate) fn holdings_mut(&mut self, metal: Metal) -> &mut Vec<Holding> {
        match metal {
            Metal::Silver => &mut self.silver,
            Metal::Gold => &mut self.gold,
        }
    }

    /// Every holding: silver first, then gold.
    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.silver.iter().chain(self.gold.iter())
    }

    pub fn find(&self, id: &HoldingId, metal: Metal) -> Option<&Holding> {
        self.holdings(metal).iter().find(|h| &h.id == id)
    }

    /// Which collection (if any) contains a holding with this id.
    pub fn metal_of(&self, id: &HoldingId) -> Option<Metal> {
        Metal::ALL
            .into_iter()
            .find(|&metal| self.find(id, metal).is_some())
    }

    pub fn len(&self) -> usize {
        self.silver.len() + self.gold.len()
    }

    pub fn is_empty(&self) -> bool {
        self.silver.is_empty() && self.gold.is_empty()
    }
}
