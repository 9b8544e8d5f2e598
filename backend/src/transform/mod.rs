//! Transformation module.
//!
//! - Mapper: parsed rows to schema records
//! - Pipeline: text or bytes to records in one call

pub mod mapper;
pub mod pipeline;

pub use mapper::{clean_bac, lookup_header, map_rows, normalize_header, MapReport, COLUMN_MAP};
pub use pipeline::{ingest, ingest_bytes, ingest_with_report, IngestResult};
