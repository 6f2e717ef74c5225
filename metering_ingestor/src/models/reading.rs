//! Canonical in-memory representation of metering readings.
//!
//! This is the standard output of every
//! [`ConsumptionDataProvider`](crate::providers::ConsumptionDataProvider)
//! implementation, regardless of which portal endpoint the readings came from.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Quality flag the portal attaches to every reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingStatus {
    /// A real measured value.
    #[serde(rename = "VALID", alias = "OK")]
    Valid,

    /// The meter reported no value for this slot.
    #[serde(rename = "NOT_AVAILABLE")]
    NotAvailable,

    /// The slot exists in the series but the value is absent.
    #[serde(rename = "MISSING")]
    Missing,

    /// Any status string this client does not know about. Treated as usable,
    /// matching the portal's own convention of only flagging the two known
    /// bad states.
    #[serde(other)]
    Other,
}

impl ReadingStatus {
    /// Whether the reading carries a value that may enter aggregation.
    pub fn is_usable(self) -> bool {
        !matches!(self, ReadingStatus::NotAvailable | ReadingStatus::Missing)
    }
}

/// Tariff band a reading was billed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tariff {
    /// High tariff.
    #[serde(rename = "HT")]
    Ht,
    /// Low tariff.
    #[serde(rename = "NT")]
    Nt,
}

impl std::fmt::Display for Tariff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tariff::Ht => write!(f, "HT"),
            Tariff::Nt => write!(f, "NT"),
        }
    }
}

/// A single consumption reading in local civil time.
///
/// `timestamp` is the portal's 14-digit `YYYYMMDDHHMMSS` integer and is the
/// uniqueness key of a reading; `date` and `time` are the portal's display
/// strings and are never used arithmetically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Consumed energy in kWh for the slot.
    pub value: f64,
    /// Local-time slot key, `YYYYMMDDHHMMSS`.
    pub timestamp: i64,
    /// Display date, `YYYY-MM-DD`.
    pub date: String,
    /// Display time, `HH:MM:SS`.
    pub time: String,
    /// Quality flag.
    pub status: ReadingStatus,
    /// Tariff band the reading was reported under.
    pub tariff: Tariff,
}

impl Reading {
    /// Hour-granularity key, `YYYYMMDDHH`.
    pub fn hour_key(&self) -> i64 {
        self.timestamp / 10_000
    }

    /// Day-granularity key, `YYYYMMDD`.
    pub fn day_key(&self) -> i64 {
        self.timestamp / 1_000_000
    }

    /// The slot instant as a local civil datetime, or `None` when the digits
    /// do not form a real date (a malformed reading).
    pub fn local_datetime(&self) -> Option<NaiveDateTime> {
        let ts = self.timestamp;
        let second = (ts % 100) as u32;
        let minute = ((ts / 100) % 100) as u32;
        let hour = ((ts / 10_000) % 100) as u32;
        let day = ((ts / 1_000_000) % 100) as u32;
        let month = ((ts / 100_000_000) % 100) as u32;
        let year = (ts / 10_000_000_000) as i32;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }

    /// The calendar day the slot belongs to, if the timestamp is well formed.
    pub fn day(&self) -> Option<NaiveDate> {
        day_key_to_date(self.day_key())
    }
}

/// Converts an hour key (`YYYYMMDDHH`) to the local datetime at the start of
/// that hour.
pub fn hour_key_to_local(hour_key: i64) -> Option<NaiveDateTime> {
    let hour = (hour_key % 100) as u32;
    let day = ((hour_key / 100) % 100) as u32;
    let month = ((hour_key / 10_000) % 100) as u32;
    let year = (hour_key / 1_000_000) as i32;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)
}

/// Converts a day key (`YYYYMMDD`) to a calendar date.
pub fn day_key_to_date(day_key: i64) -> Option<NaiveDate> {
    let day = (day_key % 100) as u32;
    let month = ((day_key / 100) % 100) as u32;
    let year = (day_key / 10_000) as i32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// All readings of one tariff band over the requested window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffSeries {
    /// Tariff band of every reading in `readings`.
    pub tariff: Tariff,
    /// Readings in the order the portal returned them.
    pub readings: Vec<Reading>,
}

/// The consumption data for one request window.
///
/// Series order is part of the contract: providers list the low-tariff series
/// before the high-tariff one, so that NT wins equal-timestamp ties when the
/// normalizer collapses duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionData {
    /// Per-tariff series, NT before HT.
    pub series: Vec<TariffSeries>,
}

impl ConsumptionData {
    /// Number of readings that would survive the status filter.
    pub fn usable_count(&self) -> usize {
        self.series
            .iter()
            .flat_map(|s| s.readings.iter())
            .filter(|r| r.status.is_usable())
            .count()
    }

    /// Flattens all series into one reading list, preserving series order.
    pub fn into_readings(self) -> Vec<Reading> {
        self.series.into_iter().flat_map(|s| s.readings).collect()
    }
}
