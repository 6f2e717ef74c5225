//! The resumable high-water mark of a synced installation.

use chrono::NaiveDate;
use metering_ingestor::models::statistics::StatisticPoint;
use serde::{Deserialize, Serialize};

use crate::predict::AverageTable;

/// Durable per-installation sync state.
///
/// Invariant: `cumulative_sum` equals the sum of all bucket values for days
/// up to and including `last_confirmed_day`, counting from zero at
/// `contract_start`. A checkpoint is a plain value; each cycle returns a new
/// one and the caller decides when to persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// First day of the contract; history starts here.
    pub contract_start: NaiveDate,
    /// Latest day confirmed complete, or `None` before any day completed.
    pub last_confirmed_day: Option<NaiveDate>,
    /// Cumulative consumption in kWh through the end of
    /// `last_confirmed_day`.
    pub cumulative_sum: f64,
}

impl Checkpoint {
    /// A fresh checkpoint with no confirmed history.
    pub fn new(contract_start: NaiveDate) -> Self {
        Self {
            contract_start,
            last_confirmed_day: None,
            cumulative_sum: 0.0,
        }
    }
}

/// Everything one fetch-aggregate-checkpoint cycle hands back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Cumulative-series points in calendar order. Points for days after
    /// `last_full_day` are provisional and may be revised by a later cycle.
    pub statistics: Vec<StatisticPoint>,
    /// The checkpoint to persist once `statistics` has been committed
    /// downstream.
    pub new_checkpoint: Checkpoint,
    /// Latest day confirmed complete, mirrored from `new_checkpoint`.
    pub last_full_day: Option<NaiveDate>,
    /// Historical averages, built on full-history cycles only.
    pub average_table: Option<AverageTable>,
}
