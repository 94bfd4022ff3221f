//! Wall-clock timestamps for mailtree.
//!
//! The source document writes dates as `YYYY-MM-DD HH:MM` in the local
//! time zone. For transmission the same instant becomes an RFC 2822
//! `Date` header and a Unix `send_at` timestamp.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, TimeZone};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::error::MailtreeError;

/// Textual form used by the source document.
const SOURCE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A wall-clock timestamp in the local time zone.
///
/// Absence of a date is modeled as `Option<DateTime>` by the callers;
/// this type itself always holds a concrete instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime(chrono::DateTime<Local>);

impl DateTime {
    /// The current local time.
    pub fn now() -> Self {
        DateTime(Local::now())
    }

    /// RFC 2822 form for the mail `Date` header.
    pub fn rfc2822(&self) -> String {
        self.0.to_rfc2822()
    }

    /// Unix timestamp in seconds, used for the provider's `send_at`.
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl From<chrono::DateTime<Local>> for DateTime {
    fn from(dt: chrono::DateTime<Local>) -> Self {
        DateTime(dt)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SOURCE_FORMAT))
    }
}

impl FromStr for DateTime {
    type Err = MailtreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let naive = NaiveDateTime::parse_from_str(s.trim(), SOURCE_FORMAT)
            .map_err(|_| MailtreeError::Date(s.to_string()))?;
        match Local.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
                Ok(DateTime(dt))
            }
            chrono::LocalResult::None => Err(MailtreeError::Date(s.to_string())),
        }
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
