pub mod domain;

pub use domain::{
    AggregatedPoint, AggregationPolicy, AlignedSeries, BillLine, Bucket, ColumnName, Granularity,
    RawReading, Reading, SeriesKey, TariffClass, TouPeriod,
};
