pub mod config;
pub mod data;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod notation;
pub mod platform;
pub mod report;

pub use error::{IngestError, Result};
