//! Universal parameters for requesting consumption data from a provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Resolution/type code of a consumption series.
///
/// The portal exposes several series types per installation; which ones carry
/// data varies by meter generation. Quarter-hour is preferred, the day types
/// are the fallback for installations without a smart meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingType {
    /// 15-minute smart-meter readings (`PK_VERB_15MIN`), 96 per regular day.
    QuarterHour,
    /// Daily values derived from meter readings (`PK_VERB_TAG_METER`).
    DayMeter,
    /// Daily values from energy data management (`PK_VERB_TAG_EDM`).
    DayEdm,
}

impl ReadingType {
    /// The portal's type code for this series.
    pub fn api_code(self) -> &'static str {
        match self {
            ReadingType::QuarterHour => "PK_VERB_15MIN",
            ReadingType::DayMeter => "PK_VERB_TAG_METER",
            ReadingType::DayEdm => "PK_VERB_TAG_EDM",
        }
    }

    /// Readings per hour at this resolution; `None` for day-level series.
    pub fn readings_per_hour(self) -> Option<u32> {
        match self {
            ReadingType::QuarterHour => Some(4),
            ReadingType::DayMeter | ReadingType::DayEdm => None,
        }
    }
}

impl std::fmt::Display for ReadingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_code())
    }
}

/// Parameters for one consumption-data request.
///
/// The portal may return a smaller window than requested; callers chunk their
/// requests (one calendar month at a time) and must tolerate subsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionRequestParams {
    /// Target installation id.
    pub installation_id: String,
    /// Which series type to request.
    pub reading_type: ReadingType,
    /// First day of the window (inclusive).
    pub date_from: NaiveDate,
    /// Last day of the window (inclusive).
    pub date_to: NaiveDate,
}
