//! Short-horizon forecasting from per-(month, hour) historical averages.
//!
//! This is best-effort extrapolation, not modeling: the only guarantee is a
//! non-negative, monotonically non-decreasing forecast sum.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use metering_ingestor::models::statistics::StatisticPoint;
use serde::{Deserialize, Serialize};

/// Mean hourly consumption keyed by `month * 100 + hour_of_day` (both in
/// local civil time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageTable {
    means: BTreeMap<u32, f64>,
}

impl AverageTable {
    /// Table key for a (month, hour-of-day) pair.
    fn key(month: u32, hour: u32) -> u32 {
        month * 100 + hour
    }

    /// Builds the table from the confirmed prefix of a full-history series.
    ///
    /// Points after `confirmed_day` (local civil date of the point's instant)
    /// are provisional and excluded; with no confirmed day the table is
    /// empty.
    pub fn from_confirmed(
        points: &[StatisticPoint],
        confirmed_day: Option<NaiveDate>,
        tz: Tz,
    ) -> Self {
        let Some(confirmed) = confirmed_day else {
            return Self::default();
        };

        let mut sums: BTreeMap<u32, (f64, u32)> = BTreeMap::new();
        for p in points {
            let local = p.start.with_timezone(&tz);
            if local.date_naive() > confirmed {
                continue;
            }
            let entry = sums.entry(Self::key(local.month(), local.hour())).or_default();
            entry.0 += p.state;
            entry.1 += 1;
        }

        Self {
            means: sums
                .into_iter()
                .map(|(k, (sum, n))| (k, sum / f64::from(n)))
                .collect(),
        }
    }

    /// Mean consumption for the given local month and hour, if any history
    /// covered it.
    pub fn get(&self, month: u32, hour: u32) -> Option<f64> {
        self.means.get(&Self::key(month, hour)).copied()
    }

    /// Whether the table holds no averages at all.
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }
}

/// Extrapolates an hourly forecast from the last actual point to `now`.
///
/// The historical points are re-emitted as `{sum: 0, state: 0}` placeholders
/// so a consumer can tell zeroed history apart from genuine forecast mass;
/// forecast points then accumulate from zero. Hours without a table entry
/// carry the last actual state forward.
pub fn predict(
    actual: &[StatisticPoint],
    table: &AverageTable,
    tz: Tz,
    now: DateTime<Utc>,
) -> Vec<StatisticPoint> {
    let Some(last) = actual.last() else {
        return Vec::new();
    };

    let mut out: Vec<StatisticPoint> = actual
        .iter()
        .map(|p| StatisticPoint {
            start: p.start,
            sum: 0.0,
            state: 0.0,
        })
        .collect();

    let mut running = 0.0;
    let mut t = last.start + Duration::hours(1);
    while t <= now {
        let local = t.with_timezone(&tz);
        let state = table
            .get(local.month(), local.hour())
            .unwrap_or(last.state)
            .max(0.0);
        running += state;
        out.push(StatisticPoint {
            start: t,
            sum: running,
            state,
        });
        t += Duration::hours(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::METERING_TZ;
    use chrono::TimeZone;

    fn point(start: DateTime<Utc>, sum: f64, state: f64) -> StatisticPoint {
        StatisticPoint { start, sum, state }
    }

    /// One point per hour over the given UTC range, each consuming `state`.
    fn hourly_series(
        from: DateTime<Utc>,
        hours: u32,
        state: f64,
    ) -> Vec<StatisticPoint> {
        (0..hours)
            .map(|h| {
                let start = from + Duration::hours(i64::from(h));
                point(start, state * f64::from(h + 1), state)
            })
            .collect()
    }

    #[test]
    fn table_averages_by_local_month_and_hour() {
        // Two June days of 1.0-then-3.0 kWh alternating by hour.
        let from = Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap(); // local midnight
        let points: Vec<StatisticPoint> = (0..48)
            .map(|h| {
                let state = if h % 2 == 0 { 1.0 } else { 3.0 };
                point(from + Duration::hours(h), 0.0, state)
            })
            .collect();

        let table = AverageTable::from_confirmed(
            &points,
            Some(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()),
            METERING_TZ,
        );

        // local hour 0 is UTC 22:00 the day before; both days had state 1.0
        assert_eq!(table.get(6, 0), Some(1.0));
        assert_eq!(table.get(6, 1), Some(3.0));
        assert_eq!(table.get(7, 0), None);
    }

    #[test]
    fn provisional_points_do_not_enter_the_table() {
        let from = Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap();
        let mut points = hourly_series(from, 24, 1.0);
        // provisional tail on the 16th with wild values
        points.extend(hourly_series(from + Duration::hours(24), 3, 100.0));

        let table = AverageTable::from_confirmed(
            &points,
            Some(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
            METERING_TZ,
        );
        assert_eq!(table.get(6, 0), Some(1.0));
        assert_eq!(table.get(6, 1), Some(1.0));
    }

    #[test]
    fn no_confirmed_day_means_empty_table() {
        let from = Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap();
        let table = AverageTable::from_confirmed(&hourly_series(from, 5, 1.0), None, METERING_TZ);
        assert!(table.is_empty());
    }

    #[test]
    fn forecast_extends_hourly_to_now() {
        let from = Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap();
        let actual = hourly_series(from, 24, 1.0);
        let table = AverageTable::from_confirmed(
            &actual,
            Some(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
            METERING_TZ,
        );

        let now = from + Duration::hours(27);
        let forecast = predict(&actual, &table, METERING_TZ, now);

        // 24 placeholders + 4 forecast hours (one per hour up to and
        // including `now`)
        assert_eq!(forecast.len(), 28);
        assert!(forecast[..24].iter().all(|p| p.sum == 0.0 && p.state == 0.0));
        assert_eq!(forecast[24].start, from + Duration::hours(24));
        assert_eq!(forecast[24].sum, 1.0);
        assert_eq!(forecast[27].sum, 4.0);
    }

    #[test]
    fn missing_table_entries_carry_the_last_state_forward() {
        let from = Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap();
        let actual = vec![point(from, 2.5, 2.5)];
        let forecast = predict(&actual, &AverageTable::default(), METERING_TZ, from + Duration::hours(2));

        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[1].state, 2.5);
        assert_eq!(forecast[2].sum, 5.0);
    }

    #[test]
    fn forecast_sum_is_non_negative_and_non_decreasing() {
        let from = Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap();
        // last actual state is negative (a meter correction); the forecast
        // must clamp it away
        let actual = vec![point(from, 10.0, -0.5)];
        let forecast = predict(&actual, &AverageTable::default(), METERING_TZ, from + Duration::hours(3));

        let mut prev = 0.0;
        for p in &forecast {
            assert!(p.sum >= prev);
            assert!(p.sum >= 0.0);
            prev = p.sum;
        }
    }

    #[test]
    fn empty_history_yields_empty_forecast() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(predict(&[], &AverageTable::default(), METERING_TZ, now).is_empty());
    }
}
