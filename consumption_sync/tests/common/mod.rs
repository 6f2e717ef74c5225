//! Scripted provider and reading builders shared by the engine tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};

use metering_ingestor::models::installation::Installation;
use metering_ingestor::models::reading::{
    ConsumptionData, Reading, ReadingStatus, Tariff, TariffSeries,
};
use metering_ingestor::models::request_params::{ConsumptionRequestParams, ReadingType};
use metering_ingestor::providers::{ConsumptionDataProvider, ProviderError};

/// In-memory provider that serves canned readings, filtered to the requested
/// window like the real portal does.
#[derive(Default)]
pub struct ScriptedProvider {
    pub installations: Vec<Installation>,
    pub quarter_hour: Vec<Reading>,
    pub day_meter: Vec<Reading>,
    /// 1-based consumption-request number from which every request fails.
    pub fail_from_request: Option<usize>,
    pub consumption_requests: AtomicUsize,
}

impl ScriptedProvider {
    pub fn request_count(&self) -> usize {
        self.consumption_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsumptionDataProvider for ScriptedProvider {
    async fn list_installations(&self) -> Result<Vec<Installation>, ProviderError> {
        Ok(self.installations.clone())
    }

    async fn fetch_consumption(
        &self,
        params: &ConsumptionRequestParams,
    ) -> Result<ConsumptionData, ProviderError> {
        let n = self.consumption_requests.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(from) = self.fail_from_request {
            if n >= from {
                return Err(ProviderError::Api("scripted failure".to_string()));
            }
        }

        let master = match params.reading_type {
            ReadingType::QuarterHour => &self.quarter_hour,
            ReadingType::DayMeter | ReadingType::DayEdm => &self.day_meter,
        };
        let readings: Vec<Reading> = master
            .iter()
            .filter(|r| {
                r.day()
                    .is_some_and(|d| d >= params.date_from && d <= params.date_to)
            })
            .cloned()
            .collect();

        Ok(ConsumptionData {
            series: vec![TariffSeries {
                tariff: Tariff::Nt,
                readings,
            }],
        })
    }
}

pub fn installation(id: &str, start: NaiveDate, end: Option<NaiveDate>) -> Installation {
    Installation {
        id: id.to_string(),
        contract_start: start,
        contract_end: end,
        address: None,
    }
}

pub fn day_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Four quarter-hour readings for each listed local hour of `date`.
pub fn quarter_hours(date: NaiveDate, hours: &[u32], per_reading: f64) -> Vec<Reading> {
    let dk = day_key(date);
    hours
        .iter()
        .flat_map(|h| {
            [0i64, 15, 30, 45].into_iter().map(move |m| Reading {
                value: per_reading,
                timestamp: dk * 1_000_000 + i64::from(*h) * 10_000 + m * 100,
                date: date.to_string(),
                time: format!("{h:02}:{m:02}:00"),
                status: ReadingStatus::Valid,
                tariff: Tariff::Nt,
            })
        })
        .collect()
}

/// A regular 24-hour day of quarter-hour readings.
pub fn full_day(date: NaiveDate, per_reading: f64) -> Vec<Reading> {
    let hours: Vec<u32> = (0..24).collect();
    quarter_hours(date, &hours, per_reading)
}

/// Consecutive regular days starting at `from`.
pub fn full_days(from: NaiveDate, count: i64, per_reading: f64) -> Vec<Reading> {
    (0..count)
        .flat_map(|offset| full_day(from + Duration::days(offset), per_reading))
        .collect()
}

/// One day-level meter reading, as the daily fallback series delivers them.
pub fn daily_reading(date: NaiveDate, value: f64) -> Reading {
    Reading {
        value,
        timestamp: day_key(date) * 1_000_000,
        date: date.to_string(),
        time: "00:00:00".to_string(),
        status: ReadingStatus::Valid,
        tariff: Tariff::Nt,
    }
}
