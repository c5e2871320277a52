use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            TimeOfDay::Morning
        } else if hour < 17 {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "Morning"),
            TimeOfDay::Afternoon => write!(f, "Afternoon"),
            TimeOfDay::Evening => write!(f, "Evening"),
        }
    }
}

/// Builds human-readable event labels such as `Saturday Evening - Jun 14`.
///
/// Pure function of the timestamp and the configured offset; it never
/// influences how events are partitioned.
#[derive(Clone, Copy, Debug)]
pub struct EventNamer {
    offset: FixedOffset,
}

impl EventNamer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn name(&self, timestamp_ms: i64) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp_millis(timestamp_ms) else {
            return "Unknown Time".to_string();
        };
        let local = utc.with_timezone(&self.offset);
        format!(
            "{} {} - {}",
            local.format("%A"),
            TimeOfDay::from_hour(local.hour()),
            local.format("%b %-d")
        )
    }
}

impl Default for EventNamer {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}
