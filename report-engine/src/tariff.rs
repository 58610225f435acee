use std::collections::BTreeMap;

use meter_domain::{BillLine, TariffClass};

use crate::report::EngineError;

/// Rate table keyed by class code, supplied by configuration.
#[derive(Debug, Clone, Default)]
pub struct TariffTable {
    classes: BTreeMap<String, TariffClass>,
}

impl TariffTable {
    pub fn new(classes: BTreeMap<String, TariffClass>) -> Self {
        Self { classes }
    }

    pub fn get(&self, class_code: &str) -> Option<&TariffClass> {
        self.classes.get(class_code)
    }

    pub fn class_codes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Compute one itemized bill for one meter over one period.
    ///
    /// Charge lines, in order:
    /// 1. on/off-peak energy charges (kWh times the class rate)
    /// 2. demand charge
    /// 3. power factor penalty above the class threshold
    /// 4. Ft fuel cost adjustment over demand plus total energy
    /// 5. subtotal, VAT (table-driven rate), grand total
    ///
    /// Every monetary line is rounded to 2 decimal places. An unknown class
    /// code fails this one computation; the caller decides whether the rest
    /// of a batch still renders. Non-finite inputs are clamped to zero so a
    /// NaN can never reach a `BillLine`.
    pub fn compute_bill(
        &self,
        meter_id: &str,
        class_code: &str,
        on_peak_energy_kwh: f64,
        off_peak_energy_kwh: f64,
        demand_kw: f64,
        power_factor_ratio: f64,
    ) -> Result<BillLine, EngineError> {
        let Some(tariff) = self.classes.get(class_code) else {
            metrics::counter!("tariff_unknown_class_total").increment(1);
            return Err(EngineError::UnknownClass(class_code.to_string()));
        };

        let on_peak_kwh = sanitize(on_peak_energy_kwh);
        let off_peak_kwh = sanitize(off_peak_energy_kwh);
        let demand = sanitize(demand_kw);
        let pf_ratio = sanitize(power_factor_ratio);

        let on_peak_energy_charge = round2(on_peak_kwh * tariff.on_peak_rate);
        let off_peak_energy_charge = round2(off_peak_kwh * tariff.off_peak_rate);
        let demand_charge = round2(demand * tariff.demand_rate);
        let power_factor_charge = round2((pf_ratio - tariff.pf_threshold).max(0.0) * tariff.pf_rate);
        let ft_charge = round2((demand + on_peak_kwh + off_peak_kwh) * tariff.ft_rate);

        let subtotal = round2(
            on_peak_energy_charge
                + off_peak_energy_charge
                + demand_charge
                + power_factor_charge
                + ft_charge,
        );
        let vat = round2(subtotal * tariff.vat_rate);
        let grand_total = round2(subtotal + vat);

        Ok(BillLine {
            meter_id: meter_id.to_string(),
            class_code: class_code.to_string(),
            on_peak_energy_charge,
            off_peak_energy_charge,
            demand_charge,
            power_factor_charge,
            ft_charge,
            subtotal,
            vat,
            grand_total,
        })
    }
}

// Negative or non-finite quantities never enter a charge formula.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_class_3_1() -> TariffTable {
        let mut classes = BTreeMap::new();
        classes.insert(
            "3.1".to_string(),
            TariffClass {
                on_peak_rate: 4.1839,
                off_peak_rate: 2.6037,
                demand_rate: 132.93,
                pf_threshold: 728.0,
                pf_rate: 56.07,
                ft_rate: -0.147,
                vat_rate: 0.07,
            },
        );
        TariffTable::new(classes)
    }

    #[test]
    fn itemized_bill_for_class_3_1() {
        let table = table_with_class_3_1();
        let bill = table
            .compute_bill("MDB-1", "3.1", 1000.0, 500.0, 50.0, 0.0)
            .unwrap();

        assert_eq!(bill.on_peak_energy_charge, 4183.90);
        assert_eq!(bill.off_peak_energy_charge, 1301.85);
        assert_eq!(bill.demand_charge, 6646.50);
        assert_eq!(bill.power_factor_charge, 0.0);
        assert_eq!(bill.ft_charge, -227.85);
        assert_eq!(bill.subtotal, 11904.40);
        assert_eq!(bill.vat, 833.31);
        assert_eq!(bill.grand_total, 12737.71);
    }

    #[test]
    fn grand_total_equals_subtotal_plus_vat() {
        let table = table_with_class_3_1();
        let bill = table
            .compute_bill("MDB-1", "3.1", 123.456, 78.9, 11.1, 800.0)
            .unwrap();

        assert_eq!(bill.grand_total, round2(bill.subtotal + bill.vat));
        assert_eq!(bill.vat, round2(bill.subtotal * 0.07));
    }

    #[test]
    fn power_factor_penalty_applies_above_threshold() {
        let table = table_with_class_3_1();
        let bill = table
            .compute_bill("MDB-1", "3.1", 0.0, 0.0, 0.0, 730.0)
            .unwrap();

        // (730 - 728) * 56.07
        assert_eq!(bill.power_factor_charge, 112.14);
    }

    #[test]
    fn unknown_class_code_is_an_error() {
        let table = table_with_class_3_1();
        let err = table
            .compute_bill("MDB-1", "9.9", 1.0, 1.0, 1.0, 0.0)
            .unwrap_err();

        assert!(matches!(err, EngineError::UnknownClass(code) if code == "9.9"));
    }

    #[test]
    fn non_finite_inputs_never_produce_a_nan_bill() {
        let table = table_with_class_3_1();
        let bill = table
            .compute_bill("MDB-1", "3.1", f64::NAN, f64::INFINITY, f64::NEG_INFINITY, f64::NAN)
            .unwrap();

        assert!(bill.subtotal.is_finite());
        assert!(bill.grand_total.is_finite());
        assert_eq!(bill.grand_total, 0.0);
    }
}
