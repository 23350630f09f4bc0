//! Schema error types.

/// Errors raised while building tables or applying table operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A column name is used twice in the same table.
    #[error("duplicate column {column} in table {table}")]
    DuplicateColumn {
        /// The table being built or altered.
        table: String,
        /// The offending column name.
        column: String,
    },

    /// A referenced column does not exist in the table.
    #[error("unknown column {column} in table {table}")]
    UnknownColumn {
        /// The table being built or altered.
        table: String,
        /// The missing column name.
        column: String,
    },

    /// An index names a column the table does not have.
    #[error("index {index} on table {table} names unknown column {column}")]
    IndexColumnMissing {
        table: String,
        index: String,
        column: String,
    },

    /// An index was declared without any columns.
    #[error("index {index} on table {table} has no columns")]
    EmptyIndex { table: String, index: String },

    /// An index name is already taken on this table.
    #[error("duplicate index {index} on table {table}")]
    DuplicateIndex { table: String, index: String },

    /// A referenced index does not exist on the table.
    #[error("unknown index {index} on table {table}")]
    UnknownIndex { table: String, index: String },

    /// A junction table does not have exactly two reference columns.
    #[error("junction table {table} must have exactly two reference columns (found {found})")]
    JunctionReferenceCount {
        /// The offending table.
        table: String,
        /// How many `references(...)` columns were declared.
        found: usize,
    },
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, SchemaError>;

impl SchemaError {
    /// Creates a [`SchemaError::UnknownColumn`] for the given table and column.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a [`SchemaError::DuplicateColumn`] for the given table and column.
    pub fn duplicate_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DuplicateColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Returns `true` if this is a junction reference-count violation.
    pub fn is_junction_reference_count(&self) -> bool {
        matches!(self, Self::JunctionReferenceCount { .. })
    }
}
