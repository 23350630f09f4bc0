//! Database access for the portsql migration engine.
//!
//! Provides the [`Database`]/[`DbExecutor`] trait seam, three drivers
//! ([`SqliteDb`], [`PostgresDb`], [`MysqlDb`]), the `_portsql_migrations`
//! tracking store, and the [`runner`] that applies pending migrations with
//! strict ordering, idempotence, and per-migration atomicity.

pub mod cancel;
pub mod config;
pub mod error;
pub mod mysql;
pub mod postgres;
pub mod runner;
pub mod sqlite;
pub mod tracking;
pub mod traits;

// Re-exports for convenience.
pub use cancel::CancelToken;
pub use config::ConnectConfig;
pub use error::StoreError;
pub use mysql::MysqlDb;
pub use postgres::PostgresDb;
pub use runner::{run, run_with, RunOptions};
pub use sqlite::SqliteDb;
pub use traits::{Database, DbExecutor};
