//! PostgreSQL emitter.
//!
//! Identity columns use `GENERATED BY DEFAULT AS IDENTITY` so explicit id
//! inserts keep working; every other contract (quoting, NOT NULL placement,
//! default rendering) follows the shared rules in this crate.

use portsql_core::column::{ColumnDef, ColumnType};
use portsql_core::ops::TableOp;
use portsql_core::rules;
use portsql_core::table::Table;

use crate::render::{
    column_flag_index, create_index_sql, default_literal, finish_statements, infer_literal,
    quote_double as quote, BoolStyle,
};

/// Emits `CREATE TABLE` plus one `CREATE INDEX` statement per index.
pub fn create_table(table: &Table) -> String {
    let mut statements = vec![create_table_stmt(table)];
    for index in table.effective_indexes() {
        statements.push(create_index_sql(&table.name, &index, quote));
    }
    finish_statements(statements)
}

/// Emits the `ALTER TABLE` script for a sequence of operations.
///
/// The current table definition resolves default-literal types for
/// `change_default`; without it the literal form is inferred.
pub fn alter_table(name: &str, ops: &[TableOp], current: Option<&Table>) -> String {
    let mut statements = Vec::new();

    for op in ops {
        match op {
            TableOp::AddColumn(def) => {
                statements.push(format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    quote(name),
                    render_added_column(def)
                ));
                if let Some(index) = column_flag_index(name, def) {
                    statements.push(create_index_sql(name, &index, quote));
                }
            }

            TableOp::DropColumn { column } => {
                statements.push(format!(
                    "ALTER TABLE {} DROP COLUMN {}",
                    quote(name),
                    quote(column)
                ));
            }

            TableOp::RenameColumn { from, to } => {
                statements.push(format!(
                    "ALTER TABLE {} RENAME COLUMN {} TO {}",
                    quote(name),
                    quote(from),
                    quote(to)
                ));
            }

            TableOp::ChangeType {
                column,
                ty,
                length,
                precision,
                scale,
            } => {
                statements.push(format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
                    quote(name),
                    quote(column),
                    type_name(*ty, *length, *precision, *scale)
                ));
            }

            TableOp::ChangeNullable { column, nullable } => {
                let action = if *nullable { "DROP" } else { "SET" };
                statements.push(format!(
                    "ALTER TABLE {} ALTER COLUMN {} {action} NOT NULL",
                    quote(name),
                    quote(column)
                ));
            }

            TableOp::ChangeDefault { column, default } => match default {
                Some(raw) => {
                    let literal = match current.and_then(|t| t.column(column)) {
                        Some(def) => default_literal(raw, def.ty, BoolStyle::Keyword),
                        None => infer_literal(raw, BoolStyle::Keyword),
                    };
                    statements.push(format!(
                        "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {literal}",
                        quote(name),
                        quote(column)
                    ));
                }
                None => {
                    statements.push(format!(
                        "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
                        quote(name),
                        quote(column)
                    ));
                }
            },

            TableOp::AddIndex(index) => {
                statements.push(create_index_sql(name, index, quote));
            }

            TableOp::DropIndex { name: index } => {
                statements.push(format!("DROP INDEX {}", quote(index)));
            }

            TableOp::RenameIndex { from, to } => {
                statements.push(format!(
                    "ALTER INDEX {} RENAME TO {}",
                    quote(from),
                    quote(to)
                ));
            }
        }
    }

    finish_statements(statements)
}

/// Emits the `DROP TABLE` statement.
pub fn drop_table(name: &str) -> String {
    finish_statements(vec![format!("DROP TABLE {}", quote(name))])
}

fn create_table_stmt(table: &Table) -> String {
    let auto = rules::auto_increment_pk(table);
    let pk_count = table.primary_key_columns().len();

    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| render_column(column, auto.as_ref().map(|a| a.column.as_str()), pk_count))
        .collect();

    if pk_count > 1 {
        let columns = table
            .primary_key_columns()
            .iter()
            .map(|c| quote(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("PRIMARY KEY ({columns})"));
    }

    format!(
        "CREATE TABLE {} (\n    {}\n)",
        quote(&table.name),
        lines.join(",\n    ")
    )
}

fn render_column(column: &ColumnDef, auto_pk: Option<&str>, pk_count: usize) -> String {
    let name = quote(&column.name);
    let ty = column_type_name(column);

    // The eligible primary key swallows NOT NULL and any declared default.
    if auto_pk == Some(column.name.as_str()) {
        return format!("{name} {ty} GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY");
    }

    let mut sql = format!("{name} {ty}");
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(raw) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_literal(raw, column.ty, BoolStyle::Keyword));
    }
    if column.primary_key && pk_count == 1 {
        sql.push_str(" PRIMARY KEY");
    }
    if let Some(target) = &column.references {
        sql.push_str(&format!(
            " REFERENCES {} ({})",
            quote(&target.table),
            quote(&target.column)
        ));
    }
    sql
}

/// Renders an `ADD COLUMN` definition (added columns are never the PK).
fn render_added_column(column: &ColumnDef) -> String {
    let mut sql = format!("{} {}", quote(&column.name), column_type_name(column));
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(raw) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_literal(raw, column.ty, BoolStyle::Keyword));
    }
    if let Some(target) = &column.references {
        sql.push_str(&format!(
            " REFERENCES {} ({})",
            quote(&target.table),
            quote(&target.column)
        ));
    }
    sql
}

fn column_type_name(column: &ColumnDef) -> String {
    type_name(column.ty, column.length, column.precision, column.scale)
}

fn type_name(
    ty: ColumnType,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> String {
    match ty {
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::String => format!("VARCHAR({})", length.unwrap_or(255)),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Float => "DOUBLE PRECISION".to_string(),
        ColumnType::Decimal => match (precision, scale) {
            (Some(p), Some(s)) => format!("DECIMAL({p},{s})"),
            _ => "DECIMAL".to_string(),
        },
        ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP WITH TIME ZONE".to_string(),
        ColumnType::Binary => "BYTEA".to_string(),
        ColumnType::Json => "JSONB".to_string(),
    }
}
