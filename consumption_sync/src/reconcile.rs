//! Extending the cumulative series and advancing the checkpoint.

use chrono::NaiveDate;
use chrono_tz::Tz;
use metering_ingestor::models::statistics::StatisticPoint;
use tracing::debug;

use crate::aggregate::HourlyBucket;
use crate::calendar::local_to_utc;
use crate::checkpoint::Checkpoint;

/// Folds a window's hourly buckets into statistic points and computes the
/// next checkpoint.
///
/// Buckets for days at or before the prior `last_confirmed_day` are skipped
/// entirely: their mass is already inside the checkpoint sum, so re-fetched
/// overlap can never double count. All later buckets are emitted, seeded from
/// the checkpoint sum; when the walk passes the last bucket of
/// `candidate_last_full_day` the running total at that point becomes the new
/// checkpoint. With no complete day in the window the checkpoint is returned
/// unchanged and every emitted point is provisional.
pub fn reconcile(
    hours: &[HourlyBucket],
    prior: &Checkpoint,
    candidate_last_full_day: Option<NaiveDate>,
    tz: Tz,
) -> (Vec<StatisticPoint>, Checkpoint) {
    let confirmed = prior.last_confirmed_day;
    let mut running = prior.cumulative_sum;
    let mut points = Vec::with_capacity(hours.len());
    let mut next = prior.clone();

    for bucket in hours {
        if confirmed.is_some_and(|d| bucket.date <= d) {
            continue;
        }

        running += bucket.value;
        points.push(StatisticPoint {
            start: local_to_utc(bucket.start_local, tz),
            sum: running,
            state: bucket.value,
        });

        // Buckets of one day are contiguous, so the last assignment for the
        // candidate day carries the day's full total.
        if candidate_last_full_day == Some(bucket.date) {
            next = Checkpoint {
                contract_start: prior.contract_start,
                last_confirmed_day: Some(bucket.date),
                cumulative_sum: running,
            };
        }
    }

    debug!(
        points = points.len(),
        confirmed = ?next.last_confirmed_day,
        sum = next.cumulative_sum,
        "reconciled window"
    );
    (points, next)
}
