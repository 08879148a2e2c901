//! Station time and the live clock readout.

use chrono::{DateTime, FixedOffset, Timelike, Utc};

/// Source of the current station time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current wall-clock time at the station.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the system clock and shifts it to the station's offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// A clock for the station at `offset`.
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Format a time the way the station's player shows it: `hh:mm a. m.`.
#[must_use]
pub fn format_clock<T: Timelike>(time: &T) -> String {
    let (pm, hour) = time.hour12();
    let meridiem = if pm { "p. m." } else { "a. m." };
    format!("{hour:02}:{:02} {meridiem}", time.minute())
}
