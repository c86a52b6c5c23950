//! Time utilities: zone-aware "now"/"today" and lenient timestamp parsing.

use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Parse an IANA zone name like "America/Chicago".
pub fn zone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow!("invalid timezone: {tz}"))
}

/// Wall-clock time in `tz` at the UTC instant `now`.
pub fn now_in_zone(now: DateTime<Utc>, tz: &str) -> Result<NaiveDateTime> {
    Ok(now.with_timezone(&zone(tz)?).naive_local())
}

/// Calendar date in `tz` at the UTC instant `now`.
pub fn today_in_zone(now: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    Ok(now_in_zone(now, tz)?.date())
}

/// A transaction timestamp as the backend sent it.
///
/// Most records carry plain wall-clock time, which is already local. Records
/// written with an offset keep it until [`Timestamp::localized`] moves them
/// into the display zone, so an instant near midnight lands on the right
/// calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Wall(NaiveDateTime),
    Instant(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Wall-clock reading. An unlocalized instant reads at its own offset.
    pub fn wall(&self) -> NaiveDateTime {
        match self {
            Timestamp::Wall(ndt) => *ndt,
            Timestamp::Instant(dt) => dt.naive_local(),
        }
    }

    /// Wall-clock time in `tz`; plain wall-clock values pass through.
    pub fn in_zone(&self, tz: &Tz) -> NaiveDateTime {
        match self {
            Timestamp::Wall(ndt) => *ndt,
            Timestamp::Instant(dt) => dt.with_timezone(tz).naive_local(),
        }
    }

    pub fn localized(self, tz: &Tz) -> Self {
        Timestamp::Wall(self.in_zone(tz))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(ndt: NaiveDateTime) -> Self {
        Timestamp::Wall(ndt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Wall(ndt) => write!(f, "{}", ndt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Instant(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (the offset is kept), a naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS[.f]`, or a bare date
/// (taken as midnight).
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Timestamp::Instant(dt));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Timestamp::Wall(ndt));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| Timestamp::Wall(d.and_time(NaiveTime::MIN)))
        .map_err(|e| anyhow!("invalid timestamp '{raw}': {e}"))
}
