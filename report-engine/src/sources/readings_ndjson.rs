use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use meter_domain::{RawReading, Reading};

use crate::report::{self, EngineError, IngestStats};

/// NDJSON file source: one `RawReading` object per line, e.g.
/// `{"ts":"2024-03-05 09:05:00","meter_id":"MDB-1","fields":{"Demand W":10.5}}`.
///
/// Malformed lines and unparsable timestamps are dropped and counted.
pub struct ReadingsNdjsonFileSource {
    path: PathBuf,
}

impl ReadingsNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<(Vec<Reading>, IngestStats), EngineError> {
        let file = File::open(&self.path)
            .map_err(|e| EngineError::Source(format!("failed to open NDJSON file: {e}")))?;
        parse_reader(BufReader::new(file))
    }
}

pub fn parse_reader<R: BufRead>(reader: R) -> Result<(Vec<Reading>, IngestStats), EngineError> {
    let mut raw = Vec::new();
    let mut malformed = 0usize;

    for line in reader.lines() {
        let line = line.map_err(|e| EngineError::Source(format!("failed to read line: {e}")))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawReading>(trimmed) {
            Ok(record) => raw.push(record),
            Err(e) => {
                metrics::counter!("readings_ndjson_parse_errors_total").increment(1);
                tracing::debug!(error = %e, "skipping malformed NDJSON line");
                malformed += 1;
            }
        }
    }

    let (readings, mut stats) = report::normalize_batch(raw);
    stats.dropped += malformed;
    Ok((readings, stats))
}
