use serde::{Deserialize, Serialize};

use super::holding::Metal;

/// Daily change of one metal's spot price.
///
/// `None` means the source did not report it, which is different from a
/// reported change of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyChange {
    pub amount: Option<f64>,
    pub percent: Option<f64>,
}

impl DailyChange {
    pub fn new(amount: Option<f64>, percent: Option<f64>) -> Self {
        Self { amount, percent }
    }

    /// Both amount and percent are known.
    pub fn is_known(&self) -> bool {
        self.amount.is_some() && self.percent.is_some()
    }
}

/// Daily changes for both metals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotChange {
    pub silver: DailyChange,
    pub gold: DailyChange,
}

impl SpotChange {
    pub fn for_metal(&self, metal: Metal) -> DailyChange {
        match metal {
            Metal::Silver => self.silver,
            Metal::Gold => self.gold,
        }
    }
}

/// Spot prices (USD per troy ounce) for silver and gold.
///
/// Always replaced as a whole; the default (zero prices) stands in until
/// the first successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    pub silver: f64,
    pub gold: f64,
    pub timestamp: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub change: SpotChange,
}

impl SpotQuote {
    pub fn new(silver: f64, gold: f64) -> Self {
        Self {
            silver,
            gold,
            ..Self::default()
        }
    }

    pub fn price(&self, metal: Metal) -> f64 {
        match metal {
            Metal::Silver => self.silver,
            Metal::Gold => self.gold,
        }
    }

    /// No successful fetch has produced this quote yet.
    pub fn is_placeholder(&self) -> bool {
        self.silver == 0.0 && self.gold == 0.0 && self.timestamp.is_none()
    }
}
