//! Bucketing normalized readings into hours and days, and deciding which
//! days are complete.
//!
//! The pipeline mirrors the portal data's shape: quarter-hour readings are
//! summed into hourly buckets keyed by the `YYYYMMDDHH` prefix of their
//! timestamp, and a day is complete when its hourly bucket count matches the
//! DST-aware day length (23/24/25). Only the latest complete day governs
//! checkpoint advancement; completeness of earlier days is not monotonic
//! across fetches, so the maximum is what matters.

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use indexmap::IndexMap;
use metering_ingestor::models::reading::{Reading, hour_key_to_local};

use crate::calendar::expected_readings_per_day;

/// Sum of all readings within one local civil hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyBucket {
    /// Hour key, `YYYYMMDDHH`.
    pub hour_key: i64,
    /// Calendar day the hour belongs to.
    pub date: NaiveDate,
    /// Local start of the hour, the bucket's display/ordering anchor.
    pub start_local: NaiveDateTime,
    /// Summed consumption over the hour in kWh.
    pub value: f64,
    /// Number of raw readings that entered the sum.
    pub reading_count: usize,
}

/// Per-day view over the hourly buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucket {
    /// Calendar day.
    pub date: NaiveDate,
    /// Summed consumption over the day in kWh.
    pub value: f64,
    /// Number of hourly buckets the day produced.
    pub hour_count: usize,
    /// Local start of the day's earliest hour.
    pub first_hour: NaiveDateTime,
}

impl DailyBucket {
    /// Whether the day's hourly bucket count matches its DST-aware length.
    pub fn is_complete(&self, tz: Tz) -> bool {
        self.hour_count as u32 == expected_readings_per_day(self.date, tz, 1)
    }
}

/// Groups normalized readings into hourly buckets.
///
/// Expects its input in timestamp order (the normalizer's output); buckets
/// come out in the same chronological order. Readings whose timestamp digits
/// do not form a real date have already been dropped by the normalizer and
/// are skipped here as well.
pub fn bucket_hours(readings: &[Reading]) -> Vec<HourlyBucket> {
    let mut buckets: IndexMap<i64, HourlyBucket> = IndexMap::new();
    for r in readings {
        let key = r.hour_key();
        let Some(start_local) = hour_key_to_local(key) else {
            continue;
        };
        let bucket = buckets.entry(key).or_insert_with(|| HourlyBucket {
            hour_key: key,
            date: start_local.date(),
            start_local,
            value: 0.0,
            reading_count: 0,
        });
        bucket.value += r.value;
        bucket.reading_count += 1;
    }
    buckets.into_values().collect()
}

/// Collapses hourly buckets into daily buckets, preserving order.
pub fn bucket_days(hours: &[HourlyBucket]) -> Vec<DailyBucket> {
    let mut days: IndexMap<NaiveDate, DailyBucket> = IndexMap::new();
    for h in hours {
        let day = days.entry(h.date).or_insert_with(|| DailyBucket {
            date: h.date,
            value: 0.0,
            hour_count: 0,
            first_hour: h.start_local,
        });
        day.value += h.value;
        day.hour_count += 1;
        if h.start_local < day.first_hour {
            day.first_hour = h.start_local;
        }
    }
    days.into_values().collect()
}

/// The latest calendar day whose hourly bucket count matches the expected
/// DST-aware count, or `None` when no day in the window is complete.
pub fn last_complete_day(days: &[DailyBucket], tz: Tz) -> Option<NaiveDate> {
    days.iter()
        .filter(|d| d.is_complete(tz))
        .map(|d| d.date)
        .max()
}
