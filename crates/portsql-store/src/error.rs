//! Store error types.

use portsql_core::name::NameError;
use portsql_dialect::DialectError;
use portsql_plan::PlanError;

/// Errors that can occur while talking to a database or running migrations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish or maintain a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transaction could not be started or committed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A raw query or statement failed outside a migration.
    #[error("query error: {0}")]
    Query(String),

    /// A migration's SQL failed; prior migrations keep their committed state.
    #[error("migration {name} failed: {reason}")]
    Migration {
        /// Name of the migration that failed.
        name: String,
        /// Underlying error description.
        reason: String,
    },

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

    /// The dialect identifier is not `postgres`, `mysql`, or `sqlite`.
    #[error("unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// The run was cancelled at a statement boundary.
    #[error("cancelled while applying migration {name}")]
    Cancelled {
        /// Name of the migration that was in flight.
        name: String,
    },

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the store crate.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Returns `true` if the error is transient and the operation may
    /// succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Transaction(_))
    }

    /// Returns `true` if this run was cancelled rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl From<DialectError> for StoreError {
    fn from(e: DialectError) -> Self {
        Self::UnsupportedDialect(e.0)
    }
}

impl From<PlanError> for StoreError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InvalidName(e) => Self::InvalidName(e),
            PlanError::OutOfOrder { previous, name } => Self::OutOfOrder { previous, name },
            other => Self::Internal(other.to_string()),
        }
    }
}
