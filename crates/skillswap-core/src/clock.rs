//! Server-assigned timestamps.

use chrono::{DateTime, SubsecRound as _, Utc};

/// The current instant, truncated to microseconds so that a value survives a
/// round-trip through any backend that stores microsecond precision.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }
