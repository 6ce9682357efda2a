//! Price file ingestion
//!
//! - [`archive`]: locate the data file inside an uploaded zip (and build export zips)
//! - [`parser`]: lenient, positional CSV parsing into [`PriceRecord`]s
//! - [`transaction`]: all-or-nothing batch insert with per-row savepoints
//! - [`summary`]: table-wide statistics read after commit
//! - [`pipeline`]: [`ImportPipeline`] tying the stages together
//! - [`export`]: CSV rendering of stored rows in the import layout

pub mod archive;
pub mod error;
pub mod export;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod summary;
pub mod transaction;

pub use error::ImportError;
pub use models::{IngestionSummary, PriceRecord, StoredPrice};
pub use pipeline::{ImportPipeline, ImportStage};
