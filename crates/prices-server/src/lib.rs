//! Prices Server Library
//!
//! HTTP service that imports zipped CSV price lists into PostgreSQL and
//! exports the stored prices back as a zipped CSV.
//!
//! # Overview
//!
//! - **Ingest**: unpack, lenient parse, all-or-nothing insert and summary
//! - **API**: `POST`/`GET /api/v0/prices` plus health and root endpoints
//! - **Configuration**: environment-based, with `.env` support
//! - **Middleware**: CORS, request tracing, request deadline
//!
//! # Architecture
//!
//! HTTP features follow the command/query split used across the service:
//!
//! - **Commands** (`features::prices::commands`): the archive import
//! - **Queries** (`features::prices::queries`): the archive export
//!
//! Both delegate to [`ingest`], which owns the price data model and every
//! statement that touches the `prices` table.
//!
//! # Example
//!
//! ```no_run
//! use prices_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!     let app = api::create_router(pool, &config);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod ingest;
pub mod middleware;
