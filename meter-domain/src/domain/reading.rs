use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// How values of a column are combined within a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationPolicy {
    /// Largest value observed inside the bucket; ties keep the first occurrence.
    MaxInWindow,
    /// Arithmetic sum over the bucket; missing values contribute nothing.
    SumOverPeriod,
}

/// Closed vocabulary of measurement columns a meter can report.
///
/// Not every reading carries every column. The string names match the
/// headers used by the site equipment exports (see `as_str`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnName {
    #[serde(rename = "Frequency")]
    Frequency,
    #[serde(rename = "Voltage A")]
    VoltageA,
    #[serde(rename = "Voltage B")]
    VoltageB,
    #[serde(rename = "Voltage C")]
    VoltageC,
    #[serde(rename = "Voltage Total")]
    VoltageTotal,
    #[serde(rename = "Current A")]
    CurrentA,
    #[serde(rename = "Current B")]
    CurrentB,
    #[serde(rename = "Current C")]
    CurrentC,
    #[serde(rename = "Current Total")]
    CurrentTotal,
    #[serde(rename = "Watt A")]
    WattA,
    #[serde(rename = "Watt B")]
    WattB,
    #[serde(rename = "Watt C")]
    WattC,
    #[serde(rename = "Watt Total")]
    WattTotal,
    #[serde(rename = "Var A")]
    VarA,
    #[serde(rename = "Var B")]
    VarB,
    #[serde(rename = "Var C")]
    VarC,
    #[serde(rename = "Var Total")]
    VarTotal,
    #[serde(rename = "VA A")]
    VaA,
    #[serde(rename = "VA B")]
    VaB,
    #[serde(rename = "VA C")]
    VaC,
    #[serde(rename = "VA Total")]
    VaTotal,
    #[serde(rename = "Power Factor")]
    PowerFactor,
    #[serde(rename = "Demand W")]
    DemandW,
    #[serde(rename = "Demand Var")]
    DemandVar,
    #[serde(rename = "Demand VA")]
    DemandVa,
    #[serde(rename = "Import kWh")]
    ImportKwh,
    #[serde(rename = "Export kWh")]
    ExportKwh,
    #[serde(rename = "Import kVarh")]
    ImportKvarh,
    #[serde(rename = "Export kVarh")]
    ExportKvarh,
    #[serde(rename = "THD Voltage")]
    ThdVoltage,
    #[serde(rename = "THD Current")]
    ThdCurrent,
}

impl ColumnName {
    pub const ALL: [ColumnName; 31] = [
        ColumnName::Frequency,
        ColumnName::VoltageA,
        ColumnName::VoltageB,
        ColumnName::VoltageC,
        ColumnName::VoltageTotal,
        ColumnName::CurrentA,
        ColumnName::CurrentB,
        ColumnName::CurrentC,
        ColumnName::CurrentTotal,
        ColumnName::WattA,
        ColumnName::WattB,
        ColumnName::WattC,
        ColumnName::WattTotal,
        ColumnName::VarA,
        ColumnName::VarB,
        ColumnName::VarC,
        ColumnName::VarTotal,
        ColumnName::VaA,
        ColumnName::VaB,
        ColumnName::VaC,
        ColumnName::VaTotal,
        ColumnName::PowerFactor,
        ColumnName::DemandW,
        ColumnName::DemandVar,
        ColumnName::DemandVa,
        ColumnName::ImportKwh,
        ColumnName::ExportKwh,
        ColumnName::ImportKvarh,
        ColumnName::ExportKvarh,
        ColumnName::ThdVoltage,
        ColumnName::ThdCurrent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnName::Frequency => "Frequency",
            ColumnName::VoltageA => "Voltage A",
            ColumnName::VoltageB => "Voltage B",
            ColumnName::VoltageC => "Voltage C",
            ColumnName::VoltageTotal => "Voltage Total",
            ColumnName::CurrentA => "Current A",
            ColumnName::CurrentB => "Current B",
            ColumnName::CurrentC => "Current C",
            ColumnName::CurrentTotal => "Current Total",
            ColumnName::WattA => "Watt A",
            ColumnName::WattB => "Watt B",
            ColumnName::WattC => "Watt C",
            ColumnName::WattTotal => "Watt Total",
            ColumnName::VarA => "Var A",
            ColumnName::VarB => "Var B",
            ColumnName::VarC => "Var C",
            ColumnName::VarTotal => "Var Total",
            ColumnName::VaA => "VA A",
            ColumnName::VaB => "VA B",
            ColumnName::VaC => "VA C",
            ColumnName::VaTotal => "VA Total",
            ColumnName::PowerFactor => "Power Factor",
            ColumnName::DemandW => "Demand W",
            ColumnName::DemandVar => "Demand Var",
            ColumnName::DemandVa => "Demand VA",
            ColumnName::ImportKwh => "Import kWh",
            ColumnName::ExportKwh => "Export kWh",
            ColumnName::ImportKvarh => "Import kVarh",
            ColumnName::ExportKvarh => "Export kVarh",
            ColumnName::ThdVoltage => "THD Voltage",
            ColumnName::ThdCurrent => "THD Current",
        }
    }

    /// Reverse of `as_str`, used to match file headers against the vocabulary.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// Declarative column-to-policy table: cumulative energy registers are
    /// summed over the period, everything else is an instantaneous/demand
    /// quantity whose relevant aggregate is the maximum within the window.
    pub fn default_policy(&self) -> AggregationPolicy {
        match self {
            ColumnName::ImportKwh
            | ColumnName::ExportKwh
            | ColumnName::ImportKvarh
            | ColumnName::ExportKvarh => AggregationPolicy::SumOverPeriod,
            _ => AggregationPolicy::MaxInWindow,
        }
    }
}

/// A reading exactly as a source produced it, timestamp still unparsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReading {
    pub ts: String,
    pub meter_id: String,
    pub fields: BTreeMap<ColumnName, f64>,
}

/// One normalized sampling tick from a meter.
///
/// Intervals are irregular and may contain gaps or duplicates; a reading
/// carries only the columns the equipment reported on that tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub instant: PrimitiveDateTime,
    pub meter_id: String,
    pub fields: BTreeMap<ColumnName, f64>,
}
