//! Epoch-millisecond helpers.

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

pub const MS_PER_MINUTE: i64 = 60_000;

/// Whole minutes from `now` until `at`, floored and clamped at zero.
///
/// Past-due times yield `0` ("arriving now") rather than a negative count.
#[must_use]
pub const fn minutes_until(at: EpochMillis, now: EpochMillis) -> i64 {
    let minutes = at.saturating_sub(now).div_euclid(MS_PER_MINUTE);
    if minutes < 0 { 0 } else { minutes }
}
