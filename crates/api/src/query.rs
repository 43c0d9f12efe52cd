//! Small helpers for query-string parameters.

/// Clamp an optional limit into `1..=max`, with a default when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}
