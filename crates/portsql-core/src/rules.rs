//! Eligibility rules -- pure predicates over [`Table`] values.
//!
//! Every SQL emitter consults [`auto_increment_pk`] before rendering a
//! primary key; the rule lives here once so the dialects cannot drift.

use crate::column::ColumnType;
use crate::table::Table;

/// The auto-increment-eligible primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoIncrementPk {
    /// The primary-key column name.
    pub column: String,
    /// Its semantic type (`integer` or `bigint`).
    pub ty: ColumnType,
}

/// Returns the auto-increment-eligible primary key, if the table has one.
///
/// A table is eligible iff it is not a junction table, has exactly one
/// primary-key column, and that column is `integer` or `bigint`.
pub fn auto_increment_pk(table: &Table) -> Option<AutoIncrementPk> {
    if table.is_junction {
        return None;
    }
    let pks = table.primary_key_columns();
    if pks.len() != 1 {
        return None;
    }
    let pk = pks[0];
    if !pk.ty.is_integer_family() {
        return None;
    }
    Some(AutoIncrementPk {
        column: pk.name.clone(),
        ty: pk.ty,
    })
}

/// Returns `true` iff the table carries both `public_id` and `deleted_at`.
///
/// Tables created through the standard-columns path satisfy this; downstream
/// generators use it to pick CRUD-capable tables.
pub fn is_standard_table(table: &Table) -> bool {
    table.has_column("public_id") && table.has_column("deleted_at")
}

/// Filters an iterator of tables down to the standard ones.
pub fn crud_tables<'a>(tables: impl Iterator<Item = &'a Table>) -> Vec<&'a Table> {
    tables.filter(|t| is_standard_table(t)).collect()
}
