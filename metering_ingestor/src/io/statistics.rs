//! File sinks for cumulative-series statistic points.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use snafu::ResultExt;

use crate::io::sink::{ConversionSnafu, DataSink, IoSnafu, SinkError};
use crate::models::statistics::StatisticPoint;

/// Writes points as CSV with a `start,state,sum` header.
///
/// Instants are RFC-3339 UTC, so the files sort lexicographically by time.
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    /// Creates a sink writing to `path`, truncating any existing file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DataSink for CsvFileSink {
    type Output = PathBuf;

    async fn write(&self, points: &[StatisticPoint]) -> Result<Self::Output, SinkError> {
        let mut out = String::from("start,state,sum\n");
        for p in points {
            out.push_str(&format!(
                "{},{},{}\n",
                p.start.to_rfc3339(),
                p.state,
                p.sum
            ));
        }
        tokio::fs::write(&self.path, out).await.context(IoSnafu)?;
        Ok(self.path.clone())
    }
}

/// Writes points as JSON lines, one serialized point per line.
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    /// Creates a sink writing to `path`, truncating any existing file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DataSink for JsonLinesSink {
    type Output = PathBuf;

    async fn write(&self, points: &[StatisticPoint]) -> Result<Self::Output, SinkError> {
        let mut out = String::new();
        for p in points {
            let line = serde_json::to_string(p).map_err(|e| {
                ConversionSnafu {
                    message: e.to_string(),
                }
                .build()
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        tokio::fs::write(&self.path, out).await.context(IoSnafu)?;
        Ok(self.path.clone())
    }
}
