pub mod reading;
pub mod series;
pub mod tariff;

pub use reading::{AggregationPolicy, ColumnName, RawReading, Reading};
pub use series::{AggregatedPoint, AlignedSeries, Bucket, Granularity, SeriesKey, TouPeriod};
pub use tariff::{BillLine, TariffClass};
