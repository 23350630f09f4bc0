//! The migration plan -- the mutable container owning the evolving schema
//! and the ordered, append-only migration log.
//!
//! Every plan operation validates first, then mutates the schema, renders
//! the SQL for all three dialects, and appends one [`Migration`]. The plan
//! serializes to canonical JSON and is consumed by the runner in
//! `portsql-store`.

pub mod error;
pub mod migration;
pub mod plan;
pub mod schema;

pub use error::PlanError;
pub use migration::{Migration, MigrationInstructions};
pub use plan::Plan;
pub use schema::Schema;
