use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::holding::{Holding, HoldingId, Metal};

/// Fallback troy ounces per unit when the draft value is missing or invalid.
pub const DEFAULT_OZT_PER_UNIT: f64 = 1.0;
/// Fallback quantity when the draft value is missing or invalid.
pub const DEFAULT_QUANTITY: u32 = 1;
/// Fallback unit price when the draft value is missing or invalid.
pub const DEFAULT_UNIT_PRICE: f64 = 0.0;

/// Working copy of a holding while the form is open.
///
/// Any field may be missing or hold a value that would not pass validation;
/// nothing is checked until [`FormDraft::to_holding`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    /// `None` when the input named no known metal
    pub metal: Option<Metal>,
    pub product: String,
    pub ozt_per_unit: Option<f64>,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
    pub dealer: String,
    pub date: Option<NaiveDate>,
    pub notes: String,
}

/// A single field assignment on a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Metal(Option<Metal>),
    Product(String),
    OztPerUnit(Option<f64>),
    Quantity(Option<u32>),
    UnitPrice(Option<f64>),
    Dealer(String),
    Date(Option<NaiveDate>),
    Notes(String),
}

impl DraftField {
    /// Build a field assignment from a raw text input, keyed by the form
    /// field name. Unparsable numbers and dates become `None` and are
    /// replaced by their fallbacks at commit.
    pub fn from_input(name: &str, raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let field = match name {
            "metal" => DraftField::Metal(Metal::parse(trimmed)),
            "product" => DraftField::Product(raw.to_string()),
            "ozt" | "oztPerUnit" => DraftField::OztPerUnit(trimmed.parse().ok()),
            "quantity" => DraftField::Quantity(trimmed.parse().ok()),
            "unitPrice" => DraftField::UnitPrice(trimmed.parse().ok()),
            "dealer" => DraftField::Dealer(raw.to_string()),
            "date" => DraftField::Date(NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()),
            "notes" => DraftField::Notes(raw.to_string()),
            other => {
                return Err(CoreError::ValidationError(format!(
                    "Unknown holding field '{other}'"
                )))
            }
        };
        Ok(field)
    }
}

impl FormDraft {
    /// Draft for a new holding: the given metal, one unit of one ounce, bought today.
    pub fn new_for(metal: Metal, today: NaiveDate) -> Self {
        Self {
            metal: Some(metal),
            product: String::new(),
            ozt_per_unit: Some(DEFAULT_OZT_PER_UNIT),
            quantity: Some(DEFAULT_QUANTITY),
            unit_price: Some(DEFAULT_UNIT_PRICE),
            dealer: String::new(),
            date: Some(today),
            notes: String::new(),
        }
    }

    /// Draft holding every field of an existing holding.
    pub fn from_holding(holding: &Holding) -> Self {
        Self {
            metal: Some(holding.metal),
            product: holding.product.clone(),
            ozt_per_unit: Some(holding.ozt_per_unit),
            quantity: Some(holding.quantity),
            unit_price: Some(holding.unit_price),
            dealer: holding.dealer.clone().unwrap_or_default(),
            date: Some(holding.date),
            notes: holding.notes.clone().unwrap_or_default(),
        }
    }

    pub fn apply(&mut self, field: DraftField) {
        match field {
            DraftField::Metal(metal) => self.metal = metal,
            DraftField::Product(product) => self.product = product,
            DraftField::OztPerUnit(ozt) => self.ozt_per_unit = ozt,
            DraftField::Quantity(quantity) => self.quantity = quantity,
            DraftField::UnitPrice(price) => self.unit_price = price,
            DraftField::Dealer(dealer) => self.dealer = dealer,
            DraftField::Date(date) => self.date = date,
            DraftField::Notes(notes) => self.notes = notes,
        }
    }

    /// Validate the draft and turn it into a holding with the given id.
    ///
    /// Requires a non-blank product and a known metal. Numeric fields that
    /// are missing or break the holding invariants fall back to
    /// 1 ozt, quantity 1 and unit price 0; a missing date falls back to `today`.
    pub fn to_holding(&self, id: HoldingId, today: NaiveDate) -> Result<Holding, CoreError> {
        let product = self.product.trim();
        if product.is_empty() {
            return Err(CoreError::ValidationError("Product name is required".into()));
        }
        let metal = self
            .metal
            .ok_or_else(|| CoreError::ValidationError("Metal must be silver or gold".into()))?;

        let ozt_per_unit = self
            .ozt_per_unit
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_OZT_PER_UNIT);
        let quantity = self
            .quantity
            .filter(|q| *q > 0)
            .unwrap_or(DEFAULT_QUANTITY);
        let unit_price = self
            .unit_price
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_UNIT_PRICE);

        Ok(Holding {
            id,
            metal,
            product: product.to_string(),
            ozt_per_unit,
            quantity,
            unit_price,
            dealer: non_blank(&self.dealer),
            date: self.date.unwrap_or(today),
            notes: non_blank(&self.notes),
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
