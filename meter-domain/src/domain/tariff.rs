use serde::{Deserialize, Serialize};

/// Rate schedule for one class of service.
///
/// Supplied as external configuration keyed by class code (e.g. "1.1",
/// "3.2") so tariff revisions never require a code change. `ft_rate` is the
/// periodic fuel cost adjustment and is typically negative (a rebate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffClass {
    pub on_peak_rate: f64,
    pub off_peak_rate: f64,
    pub demand_rate: f64,
    pub pf_threshold: f64,
    pub pf_rate: f64,
    pub ft_rate: f64,
    pub vat_rate: f64,
}

/// Fully itemized bill for one meter over one period.
///
/// Computed on demand and handed to the caller; never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillLine {
    pub meter_id: String,
    pub class_code: String,
    pub on_peak_energy_charge: f64,
    pub off_peak_energy_charge: f64,
    pub demand_charge: f64,
    pub power_factor_charge: f64,
    pub ft_charge: f64,
    pub subtotal: f64,
    pub vat: f64,
    pub grand_total: f64,
}
