use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::statistics::StatisticPoint;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// An error occurred while trying to write the data (e.g., file I/O error).
    #[snafu(display("Failed to write data: {message}"))]
    WriteError {
        message: String,
        backtrace: Backtrace,
    },

    /// An error occurred while converting statistic points into the
    /// destination format.
    #[snafu(display("Data conversion error: {message}"))]
    ConversionError {
        message: String,
        backtrace: Backtrace,
    },

    /// A generic I/O error.
    #[snafu(display("I/O error: {source}"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// This makes the trait flexible. For example:
    /// - A file sink might return `PathBuf`, the path of the created file.
    /// - A database sink might return `usize`, the number of rows inserted.
    type Output;

    /// Writes a cycle's statistic points to the destination.
    ///
    /// # Arguments
    /// * `points` - The ordered statistic points of one cycle.
    async fn write(&self, points: &[StatisticPoint]) -> Result<Self::Output, SinkError>;
}
