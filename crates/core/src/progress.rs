//! Completion-percentage arithmetic and input clamping.
//!
//! The course aggregate is derived exclusively from per-video `completed`
//! flags: `100 * completed / total` over the active videos of a course.
//! Reported values are clamped rather than rejected; out-of-range input is
//! a client-side artifact, not a reason to drop a progress event.

use crate::MAX_PERCENT;

/// Clamp a reported progress percentage into `[0, 100]`.
///
/// Non-finite input (NaN, infinities) maps to 0 so a broken client can
/// never poison a stored percentage.
pub fn clamp_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, MAX_PERCENT)
}

/// Clamp a reported watch time to a non-negative number of seconds.
pub fn clamp_watched_seconds(value: i64) -> i64 {
    value.max(0)
}

/// Compute a course completion percentage from completed/total video counts.
///
/// A course with no active videos is defined to be 0% complete; this is
/// explicit policy, not an error.
pub fn completion_percentage(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let completed = completed.min(total);
    completed as f64 * MAX_PERCENT / total as f64
}
