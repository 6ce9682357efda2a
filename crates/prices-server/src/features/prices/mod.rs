pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::ImportPricesCommand;

pub use queries::{ExportPricesError, ExportPricesResponse};

pub use routes::prices_routes;
