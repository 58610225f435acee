use meter_domain::{AggregatedPoint, AggregationPolicy, BillLine, ColumnName, Granularity, RawReading, Reading};
use time::PrimitiveDateTime;

use crate::aggregate::{self, TimeRange};
use crate::tariff::TariffTable;
use crate::timestamp;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("timestamp error: {0}")]
    Timestamp(String),
    #[error("unknown tariff class '{0}'")]
    UnknownClass(String),
    #[error("source error: {0}")]
    Source(String),
}

impl From<crate::timestamp::NormalizeError> for EngineError {
    fn from(e: crate::timestamp::NormalizeError) -> Self {
        EngineError::Timestamp(e.to_string())
    }
}

/// Outcome of normalizing a batch of raw readings. Dropped rows are a
/// structured warning for the caller, never a fatal error: a handful of
/// malformed rows must not abort an entire report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub parsed: usize,
    pub dropped: usize,
}

impl IngestStats {
    pub fn record_dropped(&mut self, n: usize) {
        self.dropped += n;
        if n > 0 {
            metrics::counter!("readings_dropped_total").increment(n as u64);
        }
    }
}

/// Normalize raw readings, dropping and counting the ones whose timestamp
/// cannot be parsed.
pub fn normalize_batch(raw: Vec<RawReading>) -> (Vec<Reading>, IngestStats) {
    let mut readings = Vec::with_capacity(raw.len());
    let mut stats = IngestStats::default();

    for record in raw {
        match timestamp::normalize(&record.ts) {
            Ok(instant) => {
                readings.push(Reading {
                    instant,
                    meter_id: record.meter_id,
                    fields: record.fields,
                });
                stats.parsed += 1;
            }
            Err(e) => {
                tracing::debug!(meter_id = %record.meter_id, error = %e, "skipping reading");
                stats.record_dropped(1);
            }
        }
    }

    if stats.dropped > 0 {
        tracing::warn!(
            dropped = stats.dropped,
            parsed = stats.parsed,
            "dropped readings with unparsable timestamps"
        );
    }

    (readings, stats)
}

/// One chart query: explicit parameters only, no ambient selection state.
/// Doubles as the identity of a cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartRequest {
    pub meter_id: String,
    pub from: PrimitiveDateTime,
    pub to: PrimitiveDateTime,
    pub granularity: Granularity,
    pub policy: AggregationPolicy,
    pub columns: Vec<ColumnName>,
}

/// Aggregate one meter's readings for charting.
pub fn run_chart(readings: &[Reading], request: &ChartRequest) -> Vec<AggregatedPoint> {
    let scoped: Vec<Reading> = readings
        .iter()
        .filter(|r| r.meter_id == request.meter_id)
        .cloned()
        .collect();
    aggregate::aggregate(
        &scoped,
        TimeRange::new(request.from, request.to),
        request.granularity,
        request.policy,
        &request.columns,
    )
}

/// One billing query for a single meter and period. Billing a batch of
/// meters is the caller's loop, not a hidden behavior here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingRequest {
    pub meter_id: String,
    pub class_code: String,
    pub from: PrimitiveDateTime,
    pub to: PrimitiveDateTime,
    /// Cumulative energy column split on/off-peak, usually `Import kWh`.
    pub energy_column: ColumnName,
    /// Demand column whose period maximum is billed, usually `Demand W`.
    pub demand_column: ColumnName,
    /// Column compared against the class power-factor threshold, usually
    /// `Demand Var`; `None` bills no power factor penalty.
    pub power_factor_column: Option<ColumnName>,
}

/// Reduce one meter's readings to TOU-split energy, peak demand and power
/// factor ratio, then price them under the requested class.
pub fn run_bill(
    readings: &[Reading],
    table: &TariffTable,
    request: &BillingRequest,
) -> Result<BillLine, EngineError> {
    let range = TimeRange::new(request.from, request.to);
    let scoped: Vec<Reading> = readings
        .iter()
        .filter(|r| r.meter_id == request.meter_id)
        .cloned()
        .collect();

    let energy = aggregate::tou_split(&scoped, range, request.energy_column);
    let demand = aggregate::peak_demand(&scoped, range, request.demand_column).unwrap_or(0.0);
    let pf_ratio = request
        .power_factor_column
        .and_then(|column| aggregate::peak_demand(&scoped, range, column))
        .unwrap_or(0.0);

    table.compute_bill(
        &request.meter_id,
        &request.class_code,
        energy.on_peak,
        energy.off_peak,
        demand,
        pf_ratio,
    )
}
