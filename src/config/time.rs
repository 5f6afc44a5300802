use chrono::{NaiveTime, Timelike};

use crate::foundation::error::{FlightError, FlightResult};

/// Wall-clock time of day parsed from an `"HH:MM"` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    /// Hour, `0..=23`.
    pub hour: u8,
    /// Minute, `0..=59`.
    pub minute: u8,
}

impl ClockTime {
    /// Parse `"HH:MM"` (a single-digit hour such as `"9:05"` is accepted).
    ///
    /// Both fields must be plain ASCII digits; signs and whitespace inside the fields are rejected.
    pub fn parse(s: &str) -> FlightResult<Self> {
        let bad = || FlightError::validation(format!("time '{s}' is not in HH:MM format"));
        let trimmed = s.trim();
        let (h, m) = trimmed.split_once(':').ok_or_else(bad)?;
        let digits = |f: &str| f.bytes().all(|b| b.is_ascii_digit());
        if !(1..=2).contains(&h.len()) || m.len() != 2 || !digits(h) || !digits(m) {
            return Err(bad());
        }
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M").map_err(|_| bad())?;
        Ok(Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        })
    }

    /// Minutes since midnight.
    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
