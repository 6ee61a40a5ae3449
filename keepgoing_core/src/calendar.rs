//! Calendar date keys.
//!
//! A [`DateKey`] identifies one local calendar day and is rendered as
//! `YYYY-MM-DD`. It is the only notion of time the streak engine uses.

use crate::{Error, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A local calendar day, formatted as `YYYY-MM-DD`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Build a key from year, month and day; `None` if the date does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The calendar day immediately before this one
    ///
    /// Returns `None` only at the lower bound of the supported calendar.
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // chrono accepts unpadded fields, the key format does not
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_formed {
            return Err(Error::InvalidDate(s.to_string()));
        }

        NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidDate(s.to_string()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Today's date in the device's local timezone
pub fn today() -> DateKey {
    DateKey(Local::now().date_naive())
}

/// The date key one day before `day`, crossing month and year boundaries
pub fn previous_day(day: DateKey) -> Option<DateKey> {
    day.previous()
}
