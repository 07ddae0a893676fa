//! Timestamp discipline
//!
//! Every timestamp in a frame (frame-level and per-pose) is **microseconds
//! since the UNIX epoch**. This module is the only producer-side clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time in microseconds since the UNIX epoch.
///
/// A clock set before 1970 reads as 0 rather than failing.
pub fn timestamp_micros_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_to_micros)
        .unwrap_or(0)
}

/// Saturating conversion of a duration to whole microseconds
pub fn duration_to_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Microseconds to seconds, for display and animation math
pub fn micros_to_secs(micros: u64) -> f64 {
    micros as f64 / 1_000_000.0
}
