//! Table alteration operations and their in-memory application.
//!
//! [`apply_ops`] is the single pure transformation behind both
//! `Plan::update_table` (evolving the schema map) and the SQLite table
//! rebuild (computing the post-rebuild table).

use std::collections::BTreeMap;

use crate::column::{ColumnDef, ColumnType};
use crate::error::{Result, SchemaError};
use crate::table::{IndexDef, Table};

/// A single alteration applied to a table.
///
/// Each variant carries only the fields it needs; the emitters translate a
/// sequence of these into dialect-specific SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOp {
    AddColumn(ColumnDef),
    DropColumn {
        column: String,
    },
    RenameColumn {
        from: String,
        to: String,
    },
    ChangeType {
        column: String,
        ty: ColumnType,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    },
    ChangeNullable {
        column: String,
        nullable: bool,
    },
    /// `None` clears the default (`DROP DEFAULT` where the dialect has it).
    ChangeDefault {
        column: String,
        default: Option<String>,
    },
    AddIndex(IndexDef),
    DropIndex {
        name: String,
    },
    RenameIndex {
        from: String,
        to: String,
    },
}

/// Applies a sequence of operations to a table, returning the new table.
///
/// The input table is untouched; on error nothing is produced, so callers
/// can validate before mutating shared state. Column order is preserved
/// across renames; dropping a column also drops any index that named it.
pub fn apply_ops(table: &Table, ops: &[TableOp]) -> Result<Table> {
    let mut next = table.clone();
    for op in ops {
        apply_op(&mut next, op)?;
    }
    next.validate()?;
    Ok(next)
}

fn apply_op(table: &mut Table, op: &TableOp) -> Result<()> {
    match op {
        TableOp::AddColumn(def) => {
            if table.has_column(&def.name) {
                return Err(SchemaError::duplicate_column(&table.name, &def.name));
            }
            table.columns.push(def.clone());
        }

        TableOp::DropColumn { column } => {
            if !table.has_column(column) {
                return Err(SchemaError::unknown_column(&table.name, column));
            }
            table.columns.retain(|c| &c.name != column);
            table
                .indexes
                .retain(|_, index| !index.columns.iter().any(|c| c == column));
        }

        TableOp::RenameColumn { from, to } => {
            if !table.has_column(from) {
                return Err(SchemaError::unknown_column(&table.name, from));
            }
            if table.has_column(to) {
                return Err(SchemaError::duplicate_column(&table.name, to));
            }
            for column in &mut table.columns {
                if &column.name == from {
                    column.name = to.clone();
                }
            }
            for index in table.indexes.values_mut() {
                for column in &mut index.columns {
                    if column == from {
                        *column = to.clone();
                    }
                }
            }
        }

        TableOp::ChangeType {
            column,
            ty,
            length,
            precision,
            scale,
        } => {
            let name = table.name.clone();
            let def = table
                .column_mut(column)
                .ok_or_else(|| SchemaError::unknown_column(name, column))?;
            def.ty = *ty;
            def.length = *length;
            def.precision = *precision;
            def.scale = *scale;
        }

        TableOp::ChangeNullable { column, nullable } => {
            let name = table.name.clone();
            let def = table
                .column_mut(column)
                .ok_or_else(|| SchemaError::unknown_column(name, column))?;
            def.nullable = *nullable;
        }

        TableOp::ChangeDefault { column, default } => {
            let name = table.name.clone();
            let def = table
                .column_mut(column)
                .ok_or_else(|| SchemaError::unknown_column(name, column))?;
            def.default = default.clone();
        }

        TableOp::AddIndex(index) => {
            if table.indexes.contains_key(&index.name) {
                return Err(SchemaError::DuplicateIndex {
                    table: table.name.clone(),
                    index: index.name.clone(),
                });
            }
            for column in &index.columns {
                if !table.has_column(column) {
                    return Err(SchemaError::IndexColumnMissing {
                        table: table.name.clone(),
                        index: index.name.clone(),
                        column: column.clone(),
                    });
                }
            }
            table.indexes.insert(index.name.clone(), index.clone());
        }

        TableOp::DropIndex { name } => {
            if table.indexes.remove(name).is_none() {
                return Err(SchemaError::UnknownIndex {
                    table: table.name.clone(),
                    index: name.clone(),
                });
            }
        }

        TableOp::RenameIndex { from, to } => {
            if table.indexes.contains_key(to) {
                return Err(SchemaError::DuplicateIndex {
                    table: table.name.clone(),
                    index: to.clone(),
                });
            }
            let mut index = table.indexes.remove(from).ok_or(SchemaError::UnknownIndex {
                table: table.name.clone(),
                index: from.clone(),
            })?;
            index.name = to.clone();
            table.indexes.insert(to.clone(), index);
        }
    }
    Ok(())
}

/// Computes the `(target, source)` column pairs for a rebuild copy.
///
/// Follows renames through the op sequence so data survives them, and keeps
/// only columns present in both the old and the new table. Pair order is
/// the new table's column order.
pub fn copy_columns(old: &Table, new: &Table, ops: &[TableOp]) -> Vec<(String, String)> {
    // old name -> current name, threaded through renames and drops.
    let mut mapping: BTreeMap<String, String> = old
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.name.clone()))
        .collect();

    for op in ops {
        match op {
            TableOp::DropColumn { column } => {
                mapping.retain(|_, current| current != column);
            }
            TableOp::RenameColumn { from, to } => {
                for current in mapping.values_mut() {
                    if current == from {
                        *current = to.clone();
                    }
                }
            }
            _ => {}
        }
    }

    new.columns
        .iter()
        .filter_map(|column| {
            mapping
                .iter()
                .find(|(_, current)| **current == column.name)
                .map(|(source, _)| (column.name.clone(), source.clone()))
        })
        .collect()
}
