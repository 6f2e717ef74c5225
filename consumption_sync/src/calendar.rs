//! Civil-calendar and DST helpers for the metering timezone.
//!
//! What this module provides:
//! - [`is_dst`] / [`is_dst_switchover_date`]: DST predicates over local civil
//!   time.
//! - [`hours_in_day`] / [`expected_readings_per_day`]: the DST-aware length
//!   of a civil day (23, 24 or 25 hours), derived from the tz database rather
//!   than from a month heuristic, and the reading count a complete day must
//!   reach.
//! - [`local_to_utc`]: total conversion of local civil timestamps to UTC
//!   (ambiguous fall-back times resolve to the earliest instant; times inside
//!   the spring-forward gap shift forward to the first valid instant).
//! - [`month_windows`]: request windows clipped to calendar-month boundaries,
//!   the chunking unit the portal API tolerates.
//!
//! All functions are pure and total over valid dates.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

/// Civil timezone of the metering data.
pub const METERING_TZ: Tz = chrono_tz::Europe::Zurich;

/// Resolves a local civil timestamp to a zoned instant.
///
/// Ambiguous wall times (fall-back) resolve to the earliest instant; wall
/// times inside the spring-forward gap shift forward minute by minute until
/// they exist. Reading timestamps always denote a real slot, so the shift is
/// a repair path for at most one skipped hour.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    use chrono::offset::LocalResult::*;
    match tz.from_local_datetime(&naive) {
        Single(dt) => dt,
        Ambiguous(earliest, _) => earliest,
        None => {
            // cap at 24h; real tz gaps are far shorter
            let mut t = naive;
            for _ in 0..(24 * 60) {
                t += Duration::minutes(1);
                if let Single(dt) = tz.from_local_datetime(&t) {
                    return dt;
                }
            }
            unreachable!("no valid wall time within a day of {naive}")
        }
    }
}

/// Whether the given local civil time falls inside daylight-saving time.
pub fn is_dst(local: NaiveDateTime, tz: Tz) -> bool {
    !resolve_local(local, tz).offset().dst_offset().is_zero()
}

/// Whether `date` is the day on which daylight saving starts or ends,
/// i.e. the DST state at the following midnight differs from this one.
pub fn is_dst_switchover_date(date: NaiveDate, tz: Tz) -> bool {
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight exists on every date");
    let next_midnight = (date + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists on every date");
    is_dst(next_midnight, tz) != is_dst(midnight, tz)
}

/// Real length of the civil day in hours: 23 on the spring-forward
/// switchover, 25 on the fall-back switchover, 24 otherwise.
///
/// Derived from the UTC distance between consecutive local midnights, so the
/// 23-vs-25 decision follows the actual offset change direction.
pub fn hours_in_day(date: NaiveDate, tz: Tz) -> u32 {
    let start = local_to_utc(
        date.and_hms_opt(0, 0, 0).expect("midnight exists on every date"),
        tz,
    );
    let end = local_to_utc(
        (date + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .expect("midnight exists on every date"),
        tz,
    );
    (end - start).num_hours() as u32
}

/// The number of readings a complete day must contain at the given
/// resolution (`readings_per_hour` is 4 for quarter-hour data, 1 for hourly
/// buckets).
pub fn expected_readings_per_day(date: NaiveDate, tz: Tz, readings_per_hour: u32) -> u32 {
    readings_per_hour * hours_in_day(date, tz)
}

/// Converts a local civil timestamp to UTC. Total; see [`is_dst`] for the
/// resolution rules applied to ambiguous and nonexistent wall times.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    resolve_local(naive, tz).with_timezone(&Utc)
}

/// Iterator over request windows from `from` to `until` (both inclusive),
/// each clipped to calendar-month boundaries.
///
/// Yields nothing when `from > until`.
pub fn month_windows(from: NaiveDate, until: NaiveDate) -> MonthWindows {
    MonthWindows {
        current: from,
        until,
    }
}

/// Iterator returned by [`month_windows`].
#[derive(Debug, Clone)]
pub struct MonthWindows {
    current: NaiveDate,
    until: NaiveDate,
}

impl Iterator for MonthWindows {
    type Item = (NaiveDate, NaiveDate);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > self.until {
            return None;
        }
        let month_end = end_of_month(self.current);
        let window = (self.current, month_end.min(self.until));
        self.current = month_end + Duration::days(1);
        Some(window)
    }
}

/// Last day of the month containing `date`.
fn end_of_month(date: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("first of month exists for every valid year");
    first_of_next - Duration::days(1)
}
