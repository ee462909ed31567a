//! Wall clock backed by the system time.

use chrono::{DateTime, Utc};

use crate::ports::TimeSource;

/// System wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
