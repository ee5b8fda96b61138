// File time value object
// 100-nanosecond ticks since 1601-01-01 UTC

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FileTime(pub i64);

impl FileTime {
    pub fn ticks(self) -> i64 {
        self.0
    }

    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        let unix_ticks = self.0.checked_sub(UNIX_EPOCH_TICKS)?;
        let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = u32::try_from(unix_ticks.rem_euclid(TICKS_PER_SECOND) * 100).ok()?;
        DateTime::from_timestamp(secs, nanos)
    }
}

impl fmt::Display for FileTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_utc() {
            Some(time) => write!(f, "{}", time.format(DISPLAY_FORMAT)),
            None => write!(f, "<invalid timestamp {}>", self.0),
        }
    }
}
