//! The unified error type for a sync cycle.

use chrono::NaiveDate;
use metering_ingestor::providers::ProviderError;
use thiserror::Error;

/// Failure of one fetch-aggregate-checkpoint cycle.
///
/// A failed cycle never mutates checkpoint state; the host simply retries on
/// its next scheduled invocation. Failures are per installation and do not
/// affect other installations' cycles.
#[derive(Debug, Error)]
pub enum CycleError {
    /// A portal request failed; the whole cycle is aborted.
    #[error("provider request failed: {0}")]
    Provider(#[from] ProviderError),

    /// The requested installation is not in the account's installation list.
    #[error("no matching installation: {0}")]
    NoMatchingInstallation(String),

    /// A full-history fetch produced no usable readings at all, even after
    /// falling back to the daily series type.
    #[error("no usable readings between {from} and {to}")]
    EmptyWindow {
        /// First day of the attempted fetch range.
        from: NaiveDate,
        /// Last day of the attempted fetch range.
        to: NaiveDate,
    },
}
