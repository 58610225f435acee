use anyhow::{bail, Result};
use meter_domain::ColumnName;
use report_engine::{
    config::AppConfig,
    observability,
    report::{run_bill, BillingRequest},
    sources::ReadingsCsvFileSource,
};
use std::env;
use time::{Date, Month};

/// TOU billing run for one meter over the calendar month of its earliest
/// reading. The tariff table comes from `report-config.toml` (or the file
/// pointed to by `REPORT_CONFIG`).
fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        bail!("usage: monthly_bill <readings_csv_path> <meter_id> <class_code>");
    }
    let file_path = &args[1];
    let meter_id = &args[2];
    let class_code = &args[3];

    let cfg = AppConfig::load()?;
    let table = cfg.tariff_table();

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

    let date = earliest.date();
    let from = Date::from_calendar_date(date.year(), date.month(), 1)?.midnight();
    let next_month_year = if date.month() == Month::December {
        date.year() + 1
    } else {
        date.year()
    };
    let to = Date::from_calendar_date(next_month_year, date.month().next(), 1)?.midnight();

    let request = BillingRequest {
        meter_id: meter_id.clone(),
        class_code: class_code.clone(),
        from,
        to,
        energy_column: ColumnName::ImportKwh,
        demand_column: ColumnName::DemandW,
        power_factor_column: Some(ColumnName::DemandVar),
    };
    let bill = run_bill(&readings, &table, &request)?;

    println!("bill for meter {} (class {}), {} .. {}", bill.meter_id, bill.class_code, from, to);
    println!("  on-peak energy   {:>12.2}", bill.on_peak_energy_charge);
    println!("  off-peak energy  {:>12.2}", bill.off_peak_energy_charge);
    println!("  demand           {:>12.2}", bill.demand_charge);
    println!("  power factor     {:>12.2}", bill.power_factor_charge);
    println!("  Ft adjustment    {:>12.2}", bill.ft_charge);
    println!("  subtotal         {:>12.2}", bill.subtotal);
    println!("  VAT              {:>12.2}", bill.vat);
    println!("  grand total      {:>12.2}", bill.grand_total);

    Ok(())
}
