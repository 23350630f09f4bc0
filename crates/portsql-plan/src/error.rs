//! Plan error types.

use portsql_core::error::SchemaError;
use portsql_core::name::NameError;

/// Errors raised by plan operations and plan validation.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// A table with this name already exists in the schema.
    #[error("duplicate table: {0}")]
    DuplicateTable(String),

    /// The named table does not exist in the schema.
    #[error("table not found: {0}")]
    UnknownTable(String),

    /// A structural invariant was violated while building or altering.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A migration name does not match `^\d{14}_[A-Za-z0-9_]+$`.
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// Migration names are not strictly ascending.
    #[error("migrations out of order: {name} must sort after {previous}")]
    OutOfOrder {
        /// The preceding migration name.
        previous: String,
        /// The offending migration name.
        name: String,
    },

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the plan crate.
pub type Result<T> = std::result::Result<T, PlanError>;
