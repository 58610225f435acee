pub mod readings_csv;
pub mod readings_ndjson;

pub use readings_csv::ReadingsCsvFileSource;
pub use readings_ndjson::ReadingsNdjsonFileSource;
