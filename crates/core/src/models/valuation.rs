use serde::{Deserialize, Serialize};

use super::holding::{Holding, Metal};
use super::quote::{DailyChange, SpotQuote};

/// Portfolio totals at one pair of spot prices. Exact values, unrounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub total_silver_ozt: f64,
    pub total_gold_ozt: f64,
    pub silver_melt_value: f64,
    pub gold_melt_value: f64,
    /// silver_melt_value + gold_melt_value
    pub total_melt_value: f64,
    /// Sum of unit_price × quantity over both metals
    pub total_cost: f64,
    /// total_melt_value - total_cost
    pub profit_loss: f64,
    /// profit_loss / total_cost × 100, or 0 when nothing was paid
    pub profit_loss_percent: f64,
}

impl ValuationSummary {
    pub fn total_ozt(&self, metal: Metal) -> f64 {
        match metal {
            Metal::Silver => self.total_silver_ozt,
            Metal::Gold => self.total_gold_ozt,
        }
    }

    pub fn melt_value(&self, metal: Metal) -> f64 {
        match metal {
            Metal::Silver => self.silver_melt_value,
            Metal::Gold => self.gold_melt_value,
        }
    }
}

/// One lot with its derived numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub holding: Holding,
    pub total_ozt: f64,
    pub total_cost: f64,
    pub melt_value: f64,
}

/// Holdings of one metal, as listed on the holdings screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalGroup {
    pub metal: Metal,
    pub spot: f64,
    pub holdings: Vec<HoldingValuation>,
}

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub quote: SpotQuote,
    pub silver_change: DailyChange,
    pub gold_change: DailyChange,
    pub summary: ValuationSummary,
    /// Most recent purchases first
    pub recent: Vec<HoldingValuation>,
    pub holdings_count: usize,
}

/// Everything the holdings screen shows: silver group, then gold group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsView {
    pub groups: Vec<MetalGroup>,
}

impl HoldingsView {
    pub fn group(&self, metal: Metal) -> Option<&MetalGroup> {
        self.groups.iter().find(|g| g.metal == metal)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.holdings.is_empty())
    }
}
