//! Fluent builders for tables and table alterations.
//!
//! The table builder owns a vector of column definitions and hands out
//! stable `&mut` handles, so a column is configured right where it is
//! declared:
//!
//! ```
//! use portsql_core::TableBuilder;
//!
//! let mut tb = TableBuilder::new("pets");
//! tb.bigint("id").primary_key();
//! tb.string("name");
//! tb.boolean("active").default_value("true");
//! let table = tb.build().unwrap();
//! assert_eq!(table.columns.len(), 3);
//! ```

use crate::column::{ColumnDef, ColumnType};
use crate::error::{Result, SchemaError};
use crate::ops::TableOp;
use crate::table::{IndexDef, Table};

// ---------------------------------------------------------------------------
// TableBuilder
// ---------------------------------------------------------------------------

/// Builds a new [`Table`] column by column.
#[derive(Debug)]
pub struct TableBuilder {
    name: String,
    columns: Vec<ColumnDef>,
    indexes: Vec<IndexDef>,
    junction: bool,
}

impl TableBuilder {
    /// Creates a builder for an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            junction: false,
        }
    }

    /// Creates a builder preloaded with the standard columns:
    /// `id` (integer primary key), `public_id` (unique string), and the
    /// non-nullable datetime columns `created_at`, `updated_at`,
    /// `deleted_at`, plus unique indexes on `id` and `public_id`.
    /// Caller columns land after the standard prefix.
    pub fn with_standard_columns(name: impl Into<String>) -> Self {
        let mut tb = Self::new(name);
        tb.integer("id").primary_key();
        tb.string("public_id").unique();
        tb.datetime("created_at");
        tb.datetime("updated_at");
        tb.datetime("deleted_at");
        tb.add_unique_index(&["id"]);
        tb.add_unique_index(&["public_id"]);
        tb
    }

    fn push(&mut self, name: impl Into<String>, ty: ColumnType) -> &mut ColumnDef {
        self.columns.push(ColumnDef::new(name, ty));
        self.columns.last_mut().unwrap()
    }

    // -- Column type methods (one per semantic type) -------------------------

    pub fn integer(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::Integer)
    }

    pub fn bigint(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::BigInt)
    }

    pub fn string(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::String)
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::Text)
    }

    pub fn boolean(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::Boolean)
    }

    pub fn float(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::Float)
    }

    /// Declares a decimal column with the given precision and scale.
    pub fn decimal(&mut self, name: impl Into<String>, precision: u32, scale: u32) -> &mut ColumnDef {
        let column = self.push(name, ColumnType::Decimal);
        column.precision(precision, scale);
        column
    }

    pub fn datetime(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::DateTime)
    }

    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::Timestamp)
    }

    pub fn binary(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::Binary)
    }

    pub fn json(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.push(name, ColumnType::Json)
    }

    // -- Table-level flags and indexes ---------------------------------------

    /// Flags the table as a junction table. Build-time validation then
    /// requires exactly two `references(...)` columns.
    pub fn junction_table(&mut self) -> &mut Self {
        self.junction = true;
        self
    }

    /// Appends a non-unique composite index named `idx_<table>_<cols>`.
    pub fn add_index(&mut self, columns: &[&str]) -> &mut Self {
        self.indexes.push(IndexDef::derived(&self.name, columns, false));
        self
    }

    /// Appends a unique composite index named `idx_<table>_<cols>`.
    pub fn add_unique_index(&mut self, columns: &[&str]) -> &mut Self {
        self.indexes.push(IndexDef::derived(&self.name, columns, true));
        self
    }

    /// Validates the accumulated definition and produces the [`Table`].
    pub fn build(self) -> Result<Table> {
        let mut table = Table::new(self.name);
        table.columns = self.columns;
        table.is_junction = self.junction;
        for index in self.indexes {
            if table.indexes.contains_key(&index.name) {
                return Err(SchemaError::DuplicateIndex {
                    table: table.name.clone(),
                    index: index.name,
                });
            }
            table.indexes.insert(index.name.clone(), index);
        }
        table.validate()?;
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// AlterTableBuilder
// ---------------------------------------------------------------------------

/// A validated handle to a column that exists on the table being altered.
///
/// Produced by [`AlterTableBuilder::existing_column`], so index operations
/// taking handles are statically linked to real columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    name: String,
}

impl ColumnRef {
    /// The column name this handle refers to.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ColumnRef {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Collects [`TableOp`]s against a known current table.
///
/// Structural validation of the full sequence happens when the plan applies
/// the operations; `existing_column` is the one eager check, so callers can
/// anchor index work to columns that are really there.
#[derive(Debug)]
pub struct AlterTableBuilder<'a> {
    table: &'a Table,
    ops: Vec<TableOp>,
}

impl<'a> AlterTableBuilder<'a> {
    /// Creates a builder over the current table definition.
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            ops: Vec::new(),
        }
    }

    /// Returns a handle to an existing column, or an error if absent.
    pub fn existing_column(&self, name: &str) -> Result<ColumnRef> {
        if self.table.has_column(name) {
            Ok(ColumnRef {
                name: name.to_string(),
            })
        } else {
            Err(SchemaError::unknown_column(&self.table.name, name))
        }
    }

    /// Adds a column; the returned handle takes the usual fluent modifiers.
    pub fn add_column(&mut self, name: impl Into<String>, ty: ColumnType) -> &mut ColumnDef {
        self.ops.push(TableOp::AddColumn(ColumnDef::new(name, ty)));
        match self.ops.last_mut() {
            Some(TableOp::AddColumn(def)) => def,
            _ => unreachable!(),
        }
    }

    pub fn drop_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.ops.push(TableOp::DropColumn {
            column: column.into(),
        });
        self
    }

    pub fn rename_column(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.ops.push(TableOp::RenameColumn {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Changes a column's semantic type, clearing length/precision/scale.
    pub fn change_type(&mut self, column: impl Into<String>, ty: ColumnType) -> &mut Self {
        self.ops.push(TableOp::ChangeType {
            column: column.into(),
            ty,
            length: None,
            precision: None,
            scale: None,
        });
        self
    }

    /// Changes a string column's type and length in one step.
    pub fn change_type_with_length(
        &mut self,
        column: impl Into<String>,
        ty: ColumnType,
        length: u32,
    ) -> &mut Self {
        self.ops.push(TableOp::ChangeType {
            column: column.into(),
            ty,
            length: Some(length),
            precision: None,
            scale: None,
        });
        self
    }

    pub fn change_nullable(&mut self, column: impl Into<String>, nullable: bool) -> &mut Self {
        self.ops.push(TableOp::ChangeNullable {
            column: column.into(),
            nullable,
        });
        self
    }

    /// Sets or clears (`None`) a column default.
    pub fn change_default(
        &mut self,
        column: impl Into<String>,
        default: Option<String>,
    ) -> &mut Self {
        self.ops.push(TableOp::ChangeDefault {
            column: column.into(),
            default,
        });
        self
    }

    /// Adds a non-unique index over validated column handles.
    pub fn add_index(&mut self, columns: &[&ColumnRef]) -> &mut Self {
        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        self.ops
            .push(TableOp::AddIndex(IndexDef::derived(&self.table.name, &names, false)));
        self
    }

    /// Adds a unique index over validated column handles.
    pub fn add_unique_index(&mut self, columns: &[&ColumnRef]) -> &mut Self {
        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        self.ops
            .push(TableOp::AddIndex(IndexDef::derived(&self.table.name, &names, true)));
        self
    }

    pub fn drop_index(&mut self, name: impl Into<String>) -> &mut Self {
        self.ops.push(TableOp::DropIndex { name: name.into() });
        self
    }

    pub fn rename_index(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.ops.push(TableOp::RenameIndex {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// The table this builder was opened on.
    pub fn table(&self) -> &Table {
        self.table
    }

    /// Consumes the builder, yielding the collected operations in order.
    pub fn into_ops(self) -> Vec<TableOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::TableRef;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_order_is_call_order() {
        let mut tb = TableBuilder::new("pets");
        tb.bigint("id").primary_key();
        tb.string("name");
        tb.boolean("active");
        let table = tb.build().unwrap();

        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "active"]);
    }

    #[test]
    fn standard_columns_prefix() {
        let mut tb = TableBuilder::with_standard_columns("users");
        tb.string("email").unique();
        let table = tb.build().unwrap();

        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "public_id", "created_at", "updated_at", "deleted_at", "email"]
        );
        assert!(table.column("id").unwrap().primary_key);
        assert!(table.column("public_id").unwrap().unique);
        assert!(!table.column("created_at").unwrap().nullable);
        assert!(table.indexes.contains_key("idx_users_id"));
        assert!(table.indexes.contains_key("idx_users_public_id"));
        assert!(table.indexes["idx_users_public_id"].unique);
    }

    #[test]
    fn junction_without_two_references_rejected() {
        let mut tb = TableBuilder::new("pet_tags");
        tb.junction_table();
        tb.bigint("pet_id").references(TableRef::new("pets"));
        tb.bigint("tag_id");
        let err = tb.build().unwrap_err();
        assert!(err.is_junction_reference_count());
    }

    #[test]
    fn junction_with_two_references_accepted() {
        let mut tb = TableBuilder::new("pet_tags");
        tb.junction_table();
        tb.bigint("pet_id").primary_key().references(TableRef::new("pets"));
        tb.bigint("tag_id").primary_key().references(TableRef::new("tags"));
        let table = tb.build().unwrap();
        assert!(table.is_junction);
        assert_eq!(table.reference_count(), 2);
    }

    #[test]
    fn composite_index_preserves_column_order() {
        let mut tb = TableBuilder::new("events");
        tb.string("kind");
        tb.datetime("at");
        tb.add_index(&["kind", "at"]);
        let table = tb.build().unwrap();

        let index = &table.indexes["idx_events_kind_at"];
        assert_eq!(index.columns, vec!["kind", "at"]);
        assert!(!index.unique);
    }

    #[test]
    fn existing_column_errors_on_missing() {
        let table = {
            let mut tb = TableBuilder::new("users");
            tb.string("email");
            tb.build().unwrap()
        };
        let alter = AlterTableBuilder::new(&table);
        assert!(alter.existing_column("email").is_ok());
        let err = alter.existing_column("ghost").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownColumn { .. }));
    }

    #[test]
    fn alter_builder_collects_ops_in_order() {
        let table = {
            let mut tb = TableBuilder::new("users");
            tb.string("email");
            tb.string("name");
            tb.build().unwrap()
        };
        let mut alter = AlterTableBuilder::new(&table);
        alter.add_column("age", ColumnType::Integer).nullable();
        alter.rename_column("name", "full_name");
        let email = alter.existing_column("email").unwrap();
        alter.add_unique_index(&[&email]);

        let ops = alter.into_ops();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], TableOp::AddColumn(def) if def.name == "age" && def.nullable));
        assert!(matches!(&ops[1], TableOp::RenameColumn { from, to } if from == "name" && to == "full_name"));
        assert!(
            matches!(&ops[2], TableOp::AddIndex(idx) if idx.name == "idx_users_email" && idx.unique)
        );
    }
}
