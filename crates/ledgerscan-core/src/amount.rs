//! Amount text parsing

/// Parse comma-grouped decimal text into a number.
///
/// Total: never fails. Thousands separators (`,`) are removed and the rest is
/// parsed as `f64`. Empty, unparsable and non-finite input resolves to `0.0`.
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
