use anyhow::{bail, Result};
use meter_domain::{AggregationPolicy, ColumnName, Granularity};
use report_engine::{
    observability,
    report::{run_chart, ChartRequest},
    sources::ReadingsCsvFileSource,
};
use std::env;
use time::Duration;

/// Day-view demand profile: 15-minute MAX-IN-WINDOW buckets with on/off-peak
/// labels, for the earliest day present in the readings file.
fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: day_profile <readings_csv_path> <meter_id>");
    }
    let file_path = &args[1];
    let meter_id = &args[2];

    let (readings, stats) = ReadingsCsvFileSource::new(file_path).load()?;
    tracing::info!(parsed = stats.parsed, dropped = stats.dropped, "readings loaded");

    let Some(earliest) = readings
        .iter()
        .filter(|r| &r.meter_id == meter_id)
        .map(|r| r.instant)
        .min()
    else {
        bail!("no readings for meter '{meter_id}' in {file_path}");
    };

    let from = earliest.date().midnight();
    let request = ChartRequest {
        meter_id: meter_id.clone(),
        from,
        to: from + Duration::days(1),
        granularity: Granularity::FifteenMinute,
        policy: AggregationPolicy::MaxInWindow,
        columns: vec![ColumnName::DemandW, ColumnName::DemandVar, ColumnName::DemandVa],
    };
    let points = run_chart(&readings, &request);

    if points.is_empty() {
        println!("no data for the selected period");
        return Ok(());
    }

    println!("{:<17} {:<9} {:>12} {:>12} {:>12} {:>8}", "bucket", "tou", "Demand W", "Demand Var", "Demand VA", "samples");
    for point in &points {
        let tou = point.bucket.tou.map_or("-", |t| t.as_str());
        let cell = |column: ColumnName| {
            point
                .values
                .get(&column)
                .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
        };
        println!(
            "{:<17} {:<9} {:>12} {:>12} {:>12} {:>8}",
            point.bucket.start,
            tou,
            cell(ColumnName::DemandW),
            cell(ColumnName::DemandVar),
            cell(ColumnName::DemandVa),
            point.source_count,
        );
    }

    Ok(())
}
