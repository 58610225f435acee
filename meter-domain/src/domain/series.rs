use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use super::reading::ColumnName;

/// Time-of-Use period a reading or bucket falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TouPeriod {
    OnPeak,
    OffPeak,
}

impl TouPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TouPeriod::OnPeak => "on-peak",
            TouPeriod::OffPeak => "off-peak",
        }
    }
}

/// Bucket width of the active report axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Granularity {
    FifteenMinute,
    Day,
    Month,
}

/// One slot on the report axis.
///
/// `index` is the ordinal position on the axis (minute-of-day / 15 for
/// fifteen-minute buckets, day-of-month for day buckets, month-of-year for
/// month buckets). The index wraps at calendar boundaries, so chronological
/// ordering always goes through `start`, never through `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Bucket {
    pub start: PrimitiveDateTime,
    pub granularity: Granularity,
    pub index: u16,
    /// Set for fifteen-minute buckets so day-view charts can band on/off
    /// peak consistently with aggregation; `None` for day and month buckets.
    pub tou: Option<TouPeriod>,
}

/// Result of applying an aggregation policy to the readings of one bucket.
///
/// A column absent from every contributing reading is omitted from `values`;
/// consumers must treat "absent" and "zero" as distinct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub bucket: Bucket,
    pub values: BTreeMap<ColumnName, f64>,
    pub source_count: usize,
}

/// One chart series in a multi-meter comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SeriesKey {
    pub meter_id: String,
    pub column: ColumnName,
}

/// Several per-meter series merged onto one shared bucket axis.
///
/// `points[i]` holds the series values for `buckets[i]`; a key is absent
/// (not zero) when that meter produced no point for that bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub buckets: Vec<Bucket>,
    pub points: Vec<BTreeMap<SeriesKey, AggregatedPoint>>,
}
