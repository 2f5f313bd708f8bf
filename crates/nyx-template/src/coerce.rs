/// Coerces rendered text to a boolean: blank is `false`, anything else is
/// parsed naturally and falls back to `false`.
#[must_use]
pub fn to_boolean(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.parse::<bool>().unwrap_or(false)
}

/// Coerces rendered text to an integer: blank is `0`, anything else is
/// parsed naturally and falls back to `0`.
#[must_use]
pub fn to_integer(value: &str) -> i64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.parse::<i64>().unwrap_or(0)
}
