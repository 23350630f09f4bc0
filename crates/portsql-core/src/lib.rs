//! Core types for the portsql migration engine.
//!
//! This crate contains the dialect-neutral schema model: column and table
//! definitions, the fluent builders that construct them, the alteration
//! operations, and the eligibility rules consulted by every SQL emitter.

pub mod builder;
pub mod column;
pub mod error;
pub mod name;
pub mod ops;
pub mod rules;
pub mod table;

// Re-exports for convenience.
pub use builder::{AlterTableBuilder, ColumnRef, TableBuilder};
pub use column::{ColumnDef, ColumnType, TableRef};
pub use error::SchemaError;
pub use ops::TableOp;
pub use table::{IndexDef, Table};
