//! The fetch orchestrator: one engine, two modes.
//!
//! A cycle runs FULL_HISTORY when the installation has no confirmed day yet
//! (fetch from contract start, then also build the average table) and
//! INCREMENTAL otherwise (fetch from the last confirmed day rather than the
//! day after, so a then-partial day is re-absorbed in full). Requests advance
//! one
//! calendar month at a time and are awaited sequentially; the first failed
//! chunk aborts the cycle before any state is derived, so the reconciler
//! never sees partial results.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use metering_ingestor::models::reading::ConsumptionData;
use metering_ingestor::models::request_params::{ConsumptionRequestParams, ReadingType};
use metering_ingestor::providers::ConsumptionDataProvider;

use crate::aggregate::{bucket_days, bucket_hours, last_complete_day};
use crate::calendar::{METERING_TZ, month_windows};
use crate::checkpoint::{Checkpoint, CycleOutcome};
use crate::errors::CycleError;
use crate::normalize::normalize_readings;
use crate::predict::AverageTable;
use crate::reconcile::reconcile;

/// Tunables for the engine; the historic behavior variants collapsed into
/// flags.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Civil timezone the meter reports in.
    pub tz: Tz,
    /// Retry a window with the daily-meter series when the quarter-hour
    /// series comes back empty.
    pub fallback_to_daily_meter: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            tz: METERING_TZ,
            fallback_to_daily_meter: true,
        }
    }
}

/// Drives fetch-aggregate-checkpoint cycles against a provider.
///
/// The engine is stateless between cycles; independent installations may be
/// processed concurrently through the same engine since every cycle owns its
/// checkpoint value.
pub struct SyncEngine<P> {
    provider: P,
    options: EngineOptions,
}

impl<P: ConsumptionDataProvider> SyncEngine<P> {
    /// Creates an engine with default options.
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, EngineOptions::default())
    }

    /// Creates an engine with explicit options.
    pub fn with_options(provider: P, options: EngineOptions) -> Self {
        Self { provider, options }
    }

    /// The provider this engine drives, for callers that need direct access
    /// (e.g. listing installations).
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs one cycle against the current wall clock.
    pub async fn run_cycle(
        &self,
        installation_id: &str,
        checkpoint: Option<Checkpoint>,
    ) -> Result<CycleOutcome, CycleError> {
        self.run_cycle_at(installation_id, checkpoint, Utc::now()).await
    }

    /// Runs one cycle as of the given instant. Split out from
    /// [`SyncEngine::run_cycle`] so cycles are reproducible in tests.
    pub async fn run_cycle_at(
        &self,
        installation_id: &str,
        checkpoint: Option<Checkpoint>,
        now: DateTime<Utc>,
    ) -> Result<CycleOutcome, CycleError> {
        let installations = self.provider.list_installations().await?;
        let installation = installations
            .iter()
            .find(|i| i.id == installation_id)
            .ok_or_else(|| CycleError::NoMatchingInstallation(installation_id.to_string()))?;

        let prior = checkpoint.unwrap_or_else(|| Checkpoint::new(installation.contract_start));
        let full_history = prior.last_confirmed_day.is_none();
        let fetch_from = prior.last_confirmed_day.unwrap_or(prior.contract_start);
        let today = now.with_timezone(&self.options.tz).date_naive();
        let fetch_until = installation.contract_end.map_or(today, |end| end.min(today));

        let mode = if full_history { "full_history" } else { "incremental" };
        info!(
            installation = installation_id,
            mode,
            from = %fetch_from,
            until = %fetch_until,
            "starting cycle"
        );

        let mut raw = Vec::new();
        for (from, to) in month_windows(fetch_from, fetch_until) {
            let chunk = self.fetch_window(installation_id, from, to).await?;
            raw.extend(chunk.into_readings());
        }

        let readings = normalize_readings(raw);
        debug!(readings = readings.len(), "normalized window");

        if readings.is_empty() {
            if full_history {
                return Err(CycleError::EmptyWindow {
                    from: fetch_from,
                    to: fetch_until,
                });
            }
            debug!("no new readings; cycle is a no-op");
            return Ok(CycleOutcome {
                statistics: Vec::new(),
                last_full_day: prior.last_confirmed_day,
                new_checkpoint: prior,
                average_table: None,
            });
        }

        let hours = bucket_hours(&readings);
        let days = bucket_days(&hours);
        let candidate = last_complete_day(&days, self.options.tz);
        let (statistics, new_checkpoint) = reconcile(&hours, &prior, candidate, self.options.tz);

        let average_table = full_history.then(|| {
            AverageTable::from_confirmed(
                &statistics,
                new_checkpoint.last_confirmed_day,
                self.options.tz,
            )
        });

        info!(
            installation = installation_id,
            points = statistics.len(),
            last_full_day = ?new_checkpoint.last_confirmed_day,
            sum = new_checkpoint.cumulative_sum,
            "cycle finished"
        );

        Ok(CycleOutcome {
            statistics,
            last_full_day: new_checkpoint.last_confirmed_day,
            new_checkpoint,
            average_table,
        })
    }

    /// Fetches one month window, retrying with the daily-meter series when
    /// the quarter-hour series is empty of usable values.
    async fn fetch_window(
        &self,
        installation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ConsumptionData, CycleError> {
        let params = ConsumptionRequestParams {
            installation_id: installation_id.to_string(),
            reading_type: ReadingType::QuarterHour,
            date_from: from,
            date_to: to,
        };
        let data = self.provider.fetch_consumption(&params).await?;
        if data.usable_count() > 0 || !self.options.fallback_to_daily_meter {
            return Ok(data);
        }

        warn!(
            installation = installation_id,
            from = %from,
            to = %to,
            "quarter-hour series empty, falling back to daily meter values"
        );
        let fallback = ConsumptionRequestParams {
            reading_type: ReadingType::DayMeter,
            ..params
        };
        Ok(self.provider.fetch_consumption(&fallback).await?)
    }
}
