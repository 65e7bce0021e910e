use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use super::RecordError;

// Brazilian money text: thousands separated by '.', two decimals after ','.
#[allow(clippy::expect_used)]
static MONEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\d*\.)*\d+,\d{1,2}").expect("money pattern is valid")
});

/// Convert an upstream float to a 2 dp decimal, rounding half to even.
///
/// Goes through the float's shortest display form so `0.1` stays `0.1`
/// instead of picking up binary noise.
pub(crate) fn float_to_decimal(field: &'static str, value: f64) -> Result<Decimal, RecordError> {
    if !value.is_finite() {
        return Err(RecordError::field(field, format!("{value} is not a number")));
    }
    Decimal::from_str(&value.to_string())
        .map(|d| d.round_dp(2))
        .map_err(|e| RecordError::field(field, e.to_string()))
}

/// Card amounts come in cents.
pub(crate) fn cents_to_decimal(field: &'static str, cents: f64) -> Result<Decimal, RecordError> {
    let value = float_to_decimal(field, cents)?;
    value
        .checked_div(Decimal::ONE_HUNDRED)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| RecordError::field(field, format!("{cents} cents is out of range")))
}

/// First money amount found in free text, e.g. `"Maria - R$ 1.234,56"` -> `1234.56`.
pub(crate) fn parse_money(text: &str) -> Option<Decimal> {
    let found = MONEY.find(text)?;
    let normalized = found.as_str().replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).ok()
}
