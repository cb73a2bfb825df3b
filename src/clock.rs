/*
 *  clock.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wall clock access and HH:MM:SS formatting
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use arrayvec::ArrayString;
use chrono::{DateTime, Local, TimeZone, Timelike};
use core::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Error type for wall clock reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("system time unavailable: {0}")]
    Unavailable(String),
    #[error("invalid time of day {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },
}

/// Local time of day, read fresh on every tick and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePoint {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Sub-second part, used for message timestamps
    pub nanosecond: u32,
}

impl TimePoint {
    pub fn new(hour: u32, minute: u32, second: u32) -> Result<Self, ClockError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ClockError::InvalidTime { hour, minute, second });
        }
        Ok(Self { hour, minute, second, nanosecond: 0 })
    }

    pub fn with_nanos(mut self, nanosecond: u32) -> Self {
        self.nanosecond = nanosecond;
        self
    }

    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            hour: dt.hour(),
            minute: dt.minute(),
            // chrono reports a leap second as 59 plus >1e9 nanos
            second: dt.second().min(59),
            nanosecond: dt.nanosecond(),
        }
    }

    /// Zero padded 24-hour `HH:MM:SS` (no heap allocation)
    pub fn hms(&self) -> ArrayString<8> {
        let mut buf = ArrayString::new();
        let _ = write!(&mut buf, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        buf
    }
}

/// Source of the current local time.
pub trait TimeSource {
    fn now(&self) -> Result<TimePoint, ClockError>;
}

/// System wall clock in the local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Result<TimePoint, ClockError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockError::Unavailable(e.to_string()))?;

        let secs = i64::try_from(since_epoch.as_secs())
            .map_err(|e| ClockError::Unavailable(e.to_string()))?;

        let local = Local
            .timestamp_opt(secs, since_epoch.subsec_nanos())
            .single()
            .ok_or_else(|| ClockError::Unavailable(format!("ambiguous local time for {}", secs)))?;

        Ok(TimePoint::from_datetime(&local))
    }
}

/// Clock pinned to a fixed reading; `None` simulates an unset RTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedClock(pub Option<TimePoint>);

impl TimeSource for FixedClock {
    fn now(&self) -> Result<TimePoint, ClockError> {
        self.0
            .ok_or_else(|| ClockError::Unavailable("clock not set".to_string()))
    }
}
