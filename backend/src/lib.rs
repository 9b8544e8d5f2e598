//! # Annuaire - alumni directory lookup
//!
//! Loads the association's alumni spreadsheet, filters it by free-text
//! criteria, and forwards contact or error-report messages about a chosen
//! person through a relay script, under a daily cap.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Sheet CSV  │────▶│   Parser    │────▶│   Mapper    │────▶│  Directory  │
//! │ (gviz/file) │     │  (quotes)   │     │ (headers)   │     │  (filters)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │ select
//!                     ┌─────────────┐     ┌─────────────┐     ┌──────▼──────┐
//!                     │    Relay    │◀────│    Gate     │◀────│   Contact   │
//!                     │ (no answer) │     │ (10 / 24h)  │     │  (session)  │
//!                     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use annuaire::{DatasetFetcher, Directory, FilterCriteria, Settings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::default();
//!     let mut directory = Directory::new(DatasetFetcher::from_settings(&settings).fetch().await);
//!     directory.set_criteria(FilterCriteria { query: "dupont".into(), ..Default::default() });
//!     println!("{} résultats trouvés", directory.visible().len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per boundary
//! - [`models`] - Record, criteria, rate window
//! - [`parser`] - CSV scanning and decoding
//! - [`transform`] - Header mapping and ingestion
//! - [`fetch`] - Dataset retrieval
//! - [`filter`] - Search filtering
//! - [`store`] - Persisted state capability
//! - [`contact`] - Rate gate, relay and submission flow
//! - [`logs`] - Diagnostic log stream
//! - [`config`] - Constants and settings

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Ingestion
pub mod fetch;
pub mod parser;
pub mod transform;

// Search
pub mod filter;

// Messaging
pub mod contact;
pub mod store;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::Settings;

pub use error::{ContactError, FetchError, RelayError, StoreError};

pub use models::{Field, FilterCriteria, RateWindow, Record, RecordSummary};

pub use parser::{decode_auto, parse_rows};

pub use transform::{ingest, ingest_bytes, map_rows};

pub use fetch::{DataSource, DatasetFetcher};

pub use filter::{filter_records, Directory};

pub use store::{FileStore, MemoryStore, StateStore};

pub use contact::{
    build_payload, ContactForm, ContactSession, HttpRelay, MessageKind, OutboundMessageGate, QuotaStatus,
    RelayPayload, RelayTransport, SendStatus,
};
