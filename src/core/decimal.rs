//! Locale-aware decimal parsing.
//!
//! Exports use the Polish convention: `,` as the fractional separator and
//! spaces or `.` for digit grouping. The API expects plain dot decimals.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a locale-formatted decimal such as `"1 234,56"` or `"123,45"`.
///
/// Returns `Ok(None)` for a blank field so callers can decide whether the
/// value is required.
pub fn parse_locale_decimal(raw: &str) -> Result<Option<Decimal>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();

    if cleaned.contains(',') {
        // "1.234,56": dots are grouping separators
        cleaned = cleaned.replace('.', "").replace(',', ".");
    }

    if cleaned.matches('.').count() > 1 {
        return Err(format!("'{raw}' is not a decimal number"));
    }

    Decimal::from_str(&cleaned)
        .map(Some)
        .map_err(|_| format!("'{raw}' is not a decimal number"))
}
