pub mod export;

pub use export::{ExportPricesError, ExportPricesResponse};
