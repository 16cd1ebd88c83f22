// src/extractors/currency.rs
use crate::utils::error::CurrencyError;

const CURRENCY_MARKER: &str = "Rp";
const GROUP_SEPARATOR: char = '.';
const NO_BREAK_SPACE: char = '\u{a0}';

/// Parses a Rupiah amount such as `"Rp\u{a0}1.234.567"` into whole units.
///
/// The order matters: non-breaking spaces, then the currency marker, then the
/// grouping dots are removed before trimming and parsing. Anything left that
/// is not a base-10 integer is an error rather than a zero, since a silently
/// dropped amount would corrupt the totals.
pub fn parse_amount(raw: &str) -> Result<i64, CurrencyError> {
    let cleaned = raw
        .replace(NO_BREAK_SPACE, "")
        .replace(CURRENCY_MARKER, "")
        .replace(GROUP_SEPARATOR, "");

    cleaned.trim().parse::<i64>().map_err(|source| CurrencyError {
        raw: raw.to_string(),
        source,
    })
}
