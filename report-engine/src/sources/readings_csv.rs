use std::{fs::File, io::Read, path::PathBuf};

use meter_domain::{ColumnName, Reading};

use crate::report::{EngineError, IngestStats};
use crate::timestamp;

/// CSV file source for meter readings.
///
/// Expected header columns (by name):
/// - ts (any format the normalizer accepts)
/// - meter_id
/// - any subset of the measurement vocabulary (`Demand W`, `Import kWh`,
///   ...); unrecognized headers are ignored with a warning
///
/// Rows with an unparsable timestamp or an empty meter id are dropped and
/// counted; empty or non-numeric measurement cells leave that column absent
/// from the reading.
pub struct ReadingsCsvFileSource {
    path: PathBuf,
}

impl ReadingsCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<(Vec<Reading>, IngestStats), EngineError> {
        let file = File::open(&self.path)
            .map_err(|e| EngineError::Source(format!("failed to open CSV file: {e}")))?;
        parse_reader(file)
    }
}

pub fn parse_reader<R: Read>(reader: R) -> Result<(Vec<Reading>, IngestStats), EngineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| EngineError::Source(format!("failed to read CSV headers: {e}")))?
        .clone();

    let ts_idx = headers
        .iter()
        .position(|h| h == "ts")
        .ok_or_else(|| EngineError::Source("missing column 'ts' in CSV header".to_string()))?;
    let meter_idx = headers
        .iter()
        .position(|h| h == "meter_id")
        .ok_or_else(|| EngineError::Source("missing column 'meter_id' in CSV header".to_string()))?;

    let mut columns: Vec<(usize, ColumnName)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == ts_idx || idx == meter_idx {
            continue;
        }
        match ColumnName::from_name(header.trim()) {
            Some(column) => columns.push((idx, column)),
            None => tracing::warn!(header, "ignoring unrecognized CSV column"),
        }
    }

    let mut readings = Vec::new();
    let mut stats = IngestStats::default();

    for result in rdr.records() {
        let record =
            result.map_err(|e| EngineError::Source(format!("failed to read CSV record: {e}")))?;

        let ts_raw = record.get(ts_idx).unwrap_or("");
        let instant = match timestamp::normalize(ts_raw) {
            Ok(instant) => instant,
            Err(e) => {
                metrics::counter!("readings_csv_parse_errors_total").increment(1);
                tracing::debug!(error = %e, "skipping CSV row");
                stats.dropped += 1;
                continue;
            }
        };

        let meter_id = record.get(meter_idx).unwrap_or("").trim();
        if meter_id.is_empty() {
            metrics::counter!("readings_csv_parse_errors_total").increment(1);
            stats.dropped += 1;
            continue;
        }

        let mut fields = std::collections::BTreeMap::new();
        for &(idx, column) in &columns {
            if let Some(value) = record.get(idx).and_then(parse_optional_f64) {
                fields.insert(column, value);
            }
        }

        readings.push(Reading {
            instant,
            meter_id: meter_id.to_string(),
            fields,
        });
        stats.parsed += 1;
    }

    if stats.dropped > 0 {
        tracing::warn!(
            dropped = stats.dropped,
            parsed = stats.parsed,
            "dropped unusable CSV rows"
        );
    }

    Ok((readings, stats))
}

fn parse_optional_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_rows_and_drops_bad_timestamps() {
        let csv_src = "\
ts,meter_id,Demand W,Import kWh
2024-03-05 09:05:00,MDB-1,10.5,1.25
garbage,MDB-1,11.0,
05/03/2024 09:20,MDB-1,,2.5
";
        let (readings, stats) = parse_reader(csv_src.as_bytes()).unwrap();

        assert_eq!(stats, IngestStats { parsed: 2, dropped: 1 });
        assert_eq!(readings[0].instant, datetime!(2024-03-05 09:05));
        assert_eq!(readings[0].fields[&ColumnName::DemandW], 10.5);
        assert_eq!(readings[0].fields[&ColumnName::ImportKwh], 1.25);

        // Empty cells leave the column absent, not zero.
        assert_eq!(readings[1].instant, datetime!(2024-03-05 09:20));
        assert!(!readings[1].fields.contains_key(&ColumnName::DemandW));
        assert_eq!(readings[1].fields[&ColumnName::ImportKwh], 2.5);
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let csv_src = "\
ts,meter_id,Demand W,Operator Notes
2024-03-05 09:05:00,MDB-1,10.5,checked
";
        let (readings, stats) = parse_reader(csv_src.as_bytes()).unwrap();

        assert_eq!(stats.parsed, 1);
        assert_eq!(readings[0].fields.len(), 1);
    }

    #[test]
    fn missing_required_header_is_a_source_error() {
        let csv_src = "meter_id,Demand W\nMDB-1,10.5\n";
        let err = parse_reader(csv_src.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::Source(_)));
    }
}
