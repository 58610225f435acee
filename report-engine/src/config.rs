use std::collections::BTreeMap;

use meter_domain::TariffClass;
use serde::Deserialize;
use std::fs;

use crate::tariff::TariffTable;

#[derive(Debug, Clone, Deserialize)]
pub struct TariffConfig {
    pub classes: BTreeMap<String, TariffClass>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub tariff: TariffConfig,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("REPORT_CONFIG").unwrap_or_else(|_| "report-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }

    pub fn tariff_table(&self) -> TariffTable {
        TariffTable::new(self.tariff.classes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_tariff_table() {
        let toml_src = r#"
            [tariff.classes."3.1"]
            on_peak_rate = 4.1839
            off_peak_rate = 2.6037
            demand_rate = 132.93
            pf_threshold = 728.0
            pf_rate = 56.07
            ft_rate = -0.147
            vat_rate = 0.07

            [tariff.classes."1.1"]
            on_peak_rate = 5.7982
            off_peak_rate = 2.6369
            demand_rate = 0.0
            pf_threshold = 0.0
            pf_rate = 0.0
            ft_rate = -0.147
            vat_rate = 0.07
        "#;

        let cfg: AppConfig = toml::from_str(toml_src).unwrap();
        let table = cfg.tariff_table();

        assert_eq!(table.class_codes().count(), 2);
        let class = table.get("3.1").unwrap();
        assert_eq!(class.demand_rate, 132.93);
        assert_eq!(class.vat_rate, 0.07);
        assert!(table.get("9.9").is_none());
    }
}
