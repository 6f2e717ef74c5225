//! Points of the cumulative consumption series handed to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of the cumulative consumption series.
///
/// Points are produced in calendar order; across one cycle's output `sum` is
/// non-decreasing and `sum[i] == sum[i-1] + state[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticPoint {
    /// Start of the slot as an absolute instant.
    pub start: DateTime<Utc>,
    /// Running cumulative total in kWh.
    pub sum: f64,
    /// The slot's own incremental value in kWh.
    pub state: f64,
}
