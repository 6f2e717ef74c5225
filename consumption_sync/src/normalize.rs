//! Merging tariff-tagged raw series into one deduplicated reading sequence.

use metering_ingestor::models::reading::{ConsumptionData, Reading};
use tracing::warn;

/// Normalizes raw readings: drops unusable and malformed slots, sorts by
/// timestamp, and collapses duplicate timestamps.
///
/// Duplicates arise both from overlapping fetch windows and from the same
/// slot being reported under both tariffs; the first reading in sorted order
/// wins, so input order decides ties (providers list NT before HT). The
/// function is idempotent: normalizing its own output is a no-op.
pub fn normalize_readings(readings: Vec<Reading>) -> Vec<Reading> {
    let mut usable: Vec<Reading> = readings
        .into_iter()
        .filter(|r| r.status.is_usable())
        .filter(|r| {
            let well_formed = r.local_datetime().is_some();
            if !well_formed {
                warn!(timestamp = r.timestamp, "dropping reading with malformed timestamp");
            }
            well_formed
        })
        .collect();

    // stable sort, so equal timestamps keep their input order
    usable.sort_by_key(|r| r.timestamp);
    usable.dedup_by_key(|r| r.timestamp);
    usable
}

/// Convenience wrapper for a single response window.
pub fn normalize(data: ConsumptionData) -> Vec<Reading> {
    normalize_readings(data.into_readings())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metering_ingestor::models::reading::{ReadingStatus, Tariff};

    fn reading(timestamp: i64, value: f64, tariff: Tariff, status: ReadingStatus) -> Reading {
        Reading {
            value,
            timestamp,
            date: "2024-06-15".to_string(),
            time: "00:00:00".to_string(),
            status,
            tariff,
        }
    }

    #[test]
    fn filters_unusable_statuses() {
        let out = normalize_readings(vec![
            reading(20240615001500, 0.25, Tariff::Nt, ReadingStatus::Valid),
            reading(20240615003000, 0.0, Tariff::Nt, ReadingStatus::Missing),
            reading(20240615004500, 0.0, Tariff::Nt, ReadingStatus::NotAvailable),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, 20240615001500);
    }

    #[test]
    fn sorts_and_collapses_cross_tariff_duplicates() {
        // Same slot reported under both tariffs; NT comes first in input
        // order and must win.
        let out = normalize_readings(vec![
            reading(20240615003000, 0.5, Tariff::Nt, ReadingStatus::Valid),
            reading(20240615001500, 0.25, Tariff::Nt, ReadingStatus::Valid),
            reading(20240615003000, 0.9, Tariff::Ht, ReadingStatus::Valid),
        ]);
        assert_eq!(
            out.iter().map(|r| r.timestamp).collect::<Vec<_>>(),
            vec![20240615001500, 20240615003000]
        );
        let dup = &out[1];
        assert_eq!(dup.tariff, Tariff::Nt);
        assert_eq!(dup.value, 0.5);
    }

    #[test]
    fn drops_malformed_timestamps() {
        let out = normalize_readings(vec![
            reading(20241315001500, 0.25, Tariff::Nt, ReadingStatus::Valid), // month 13
            reading(20240615001500, 0.25, Tariff::Nt, ReadingStatus::Valid),
        ]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn normalizing_twice_is_identity() {
        let input = vec![
            reading(20240615003000, 0.5, Tariff::Nt, ReadingStatus::Valid),
            reading(20240615001500, 0.25, Tariff::Ht, ReadingStatus::Valid),
            reading(20240615003000, 0.75, Tariff::Ht, ReadingStatus::Valid),
        ];
        let once = normalize_readings(input);
        let twice = normalize_readings(once.clone());
        assert_eq!(once, twice);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arbitrary_reading() -> impl Strategy<Value = Reading> {
            // timestamps constrained to one June week so duplicates are likely
            (15u32..22, 0u32..24, prop::sample::select(vec![0u32, 15, 30, 45]), 0.0f64..2.0)
                .prop_map(|(day, hour, minute, value)| {
                    let timestamp = 20_240_600_000_000
                        + i64::from(day) * 1_000_000
                        + i64::from(hour) * 10_000
                        + i64::from(minute) * 100;
                    Reading {
                        value,
                        timestamp,
                        date: format!("2024-06-{day:02}"),
                        time: format!("{hour:02}:{minute:02}:00"),
                        status: ReadingStatus::Valid,
                        tariff: Tariff::Nt,
                    }
                })
        }

        proptest! {
            #[test]
            fn dedup_is_idempotent_and_unique(
                readings in proptest::collection::vec(arbitrary_reading(), 0..200),
            ) {
                let once = normalize_readings(readings);

                // each timestamp appears exactly once, in ascending order
                let timestamps: Vec<i64> = once.iter().map(|r| r.timestamp).collect();
                let mut sorted = timestamps.clone();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(&timestamps, &sorted);

                // a second pass changes nothing
                let twice = normalize_readings(once.clone());
                prop_assert_eq!(once, twice);
            }
        }
    }
}
