pub mod aggregate;
pub mod align;
pub mod cache;
pub mod config;
pub mod observability;
pub mod report;
pub mod sources;
pub mod tariff;
pub mod timestamp;
pub mod tou;

pub use report::{EngineError, IngestStats};
