use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Precious metal class of a holding. Also the partition key of the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Silver,
    Gold,
}

impl Metal {
    /// Both metals, in the order they are displayed and persisted.
    pub const ALL: [Metal; 2] = [Metal::Silver, Metal::Gold];

    /// Parse a metal name as used in stored data and form inputs (case-insensitive).
    pub fn parse(value: &str) -> Option<Metal> {
        match value.trim().to_ascii_lowercase().as_str() {
            "silver" => Some(Metal::Silver),
            "gold" => Some(Metal::Gold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Silver => "silver",
            Metal::Gold => "gold",
        }
    }
}

impl std::fmt::Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque holding identifier.
///
/// New holdings get a UUID v4. Identifiers written by earlier versions
/// (millisecond timestamps) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldingId(String);

impl HoldingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// An id that has not been assigned yet. `HoldingsStore::create` replaces it.
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HoldingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HoldingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for HoldingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single purchased lot of silver or gold.
///
/// The serialized field names are the ones the app has always written to
/// storage (`ozt`, `unitPrice`, ...), so existing data keeps loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: HoldingId,

    /// Immutable after creation; moving a lot to the other metal is delete + create.
    pub metal: Metal,

    /// Display name, e.g. "American Silver Eagle"
    pub product: String,

    /// Troy ounces of metal per unit (coin, bar, round)
    #[serde(rename = "ozt", alias = "oztPerUnit")]
    pub ozt_per_unit: f64,

    /// Number of units in the lot
    pub quantity: u32,

    /// Price paid per unit (cost basis)
    pub unit_price: f64,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub dealer: Option<String>,

    /// Purchase date, `YYYY-MM-DD`
    pub date: NaiveDate,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Holding {
    pub fn new(
        metal: Metal,
        product: impl Into<String>,
        ozt_per_unit: f64,
        quantity: u32,
        unit_price: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: HoldingId::generate(),
            metal,
            product: product.into(),
            ozt_per_unit,
            quantity,
            unit_price,
            dealer: None,
            date,
            notes: None,
        }
    }

    pub fn with_dealer(mut self, dealer: impl Into<String>) -> Self {
        self.dealer = Some(dealer.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Troy ounces in the whole lot.
    pub fn total_ozt(&self) -> f64 {
        self.ozt_per_unit * f64::from(self.quantity)
    }

    /// Amount paid for the whole lot.
    pub fn total_cost(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    /// Melt value of the whole lot at the given spot price per troy ounce.
    pub fn melt_value(&self, spot: f64) -> f64 {
        self.total_ozt() * spot
    }
}

/// Older versions stored empty strings for unset optional fields.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
