//! Text formatting for the presentation layer. Valuation numbers stay
//! exact; rounding happens only here.

use crate::models::holding::Metal;
use crate::models::quote::DailyChange;

/// Shown in place of a number that is not finite.
pub const NOT_AVAILABLE: &str = "N/A";

/// US dollars with thousands separators: `$1,234.56`, `-$20.00`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let cents = format!("{:.2}", value.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

/// Troy ounces: 2 decimals for silver, 4 for gold.
pub fn format_ozt(metal: Metal, ozt: f64) -> String {
    if !ozt.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    match metal {
        Metal::Silver => format!("{ozt:.2}"),
        Metal::Gold => format!("{ozt:.4}"),
    }
}

pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{value:.2}%")
}

/// `+$1.23 (+0.45%)`, or `None` when the source reported no usable change.
pub fn format_change(change: &DailyChange) -> Option<String> {
    let (amount, percent) = (change.amount?, change.percent?);
    if !(amount.is_finite() && percent.is_finite()) {
        return None;
    }
    let sign = if amount >= 0.0 { "+" } else { "" };
    Some(format!(
        "{sign}{} ({sign}{percent:.2}%)",
        format_currency(amount)
    ))
}
