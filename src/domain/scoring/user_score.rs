//! Per-user running score arithmetic.

/// Applies one increment to a possibly-absent score.
///
/// A missing score counts as zero. There is no floor: negative weights may
/// drive the result below zero.
pub fn increment(prior: Option<i64>, offset: i64) -> i64 {
    prior.unwrap_or(0).saturating_add(offset)
}
