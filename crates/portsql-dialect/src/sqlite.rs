//! SQLite emitter.
//!
//! SQLite natively supports `ADD COLUMN`, `DROP COLUMN` (3.35+),
//! `RENAME COLUMN` (3.25+), and index statements. Everything else goes
//! through the copy-and-swap table rebuild: create `<name>_new`, copy the
//! surviving columns, drop the old table, rename, re-create indexes.
//!
//! The eligible primary key renders as the exact token sequence
//! `INTEGER PRIMARY KEY` regardless of the declared integer width, because
//! only that literal form aliases the rowid.

use portsql_core::column::{ColumnDef, ColumnType};
use portsql_core::ops::{self, TableOp};
use portsql_core::rules;
use portsql_core::table::Table;

use crate::render::{
    column_flag_index, create_index_sql, default_literal, finish_statements,
    quote_double as quote, BoolStyle,
};

/// Emits `CREATE TABLE` plus one `CREATE INDEX` statement per index.
pub fn create_table(table: &Table) -> String {
    let mut statements = vec![create_table_stmt(table, &table.name)];
    for index in table.effective_indexes() {
        statements.push(create_index_sql(&table.name, &index, quote));
    }
    finish_statements(statements)
}

/// Emits the `ALTER TABLE` script for a sequence of operations.
///
/// When any operation needs a rebuild and `current` was not supplied, the
/// result is a single SQL comment; executing it is a no-op, so callers who
/// care must check for the `--` prefix.
pub fn alter_table(name: &str, ops: &[TableOp], current: Option<&Table>) -> String {
    if ops.iter().any(needs_rebuild) {
        return match current {
            Some(table) => rebuild_script(table, ops),
            None => format!(
                "-- ALTER TABLE {}: change_type/change_nullable/change_default require \
                 the current table definition for a table rebuild;",
                quote(name)
            ),
        };
    }

    let mut statements = Vec::new();
    for op in ops {
        match op {
            TableOp::AddColumn(def) => {
                statements.push(format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    quote(name),
                    render_plain_column(def)
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

            TableOp::AddIndex(index) => {
                statements.push(create_index_sql(name, index, quote));
            }

            TableOp::DropIndex { name: index } => {
                statements.push(format!("DROP INDEX {}", quote(index)));
            }

            TableOp::RenameIndex { from, to } => {
                // No RENAME INDEX in SQLite; drop and re-create from the
                // current definition.
                match current.and_then(|t| t.indexes.get(from)) {
                    Some(index) => {
                        let mut renamed = index.clone();
                        renamed.name = to.clone();
                        statements.push(format!("DROP INDEX {}", quote(from)));
                        statements.push(create_index_sql(name, &renamed, quote));
                    }
                    None => {
                        statements.push(format!(
                            "-- RENAME INDEX {} TO {}: current table definition required",
                            quote(from),
                            quote(to)
                        ));
                    }
                }
            }

            TableOp::ChangeType { .. }
            | TableOp::ChangeNullable { .. }
            | TableOp::ChangeDefault { .. } => {
                unreachable!("rebuild ops are handled above")
            }
        }
    }

    finish_statements(statements)
}

/// Emits the `DROP TABLE` statement.
pub fn drop_table(name: &str) -> String {
    finish_statements(vec![format!("DROP TABLE {}", quote(name))])
}

fn needs_rebuild(op: &TableOp) -> bool {
    matches!(
        op,
        TableOp::ChangeType { .. } | TableOp::ChangeNullable { .. } | TableOp::ChangeDefault { .. }
    )
}

/// Assembles the copy-and-swap script around the pure table transformation.
fn rebuild_script(current: &Table, ops: &[TableOp]) -> String {
    let new_table = match ops::apply_ops(current, ops) {
        Ok(table) => table,
        Err(e) => {
            return format!("-- ALTER TABLE {}: rebuild not emitted: {e};", quote(&current.name));
        }
    };

    let name = &current.name;
    let staging = format!("{name}_new");

    let mut statements = vec![
        "PRAGMA foreign_keys=OFF".to_string(),
        "BEGIN".to_string(),
        create_table_stmt(&new_table, &staging),
    ];

    let pairs = ops::copy_columns(current, &new_table, ops);
    if !pairs.is_empty() {
        let targets = pairs
            .iter()
            .map(|(target, _)| quote(target))
            .collect::<Vec<_>>()
            .join(", ");
        let sources = pairs
            .iter()
            .map(|(_, source)| quote(source))
            .collect::<Vec<_>>()
            .join(", ");
        statements.push(format!(
            "INSERT INTO {} ({targets}) SELECT {sources} FROM {}",
            quote(&staging),
            quote(name)
        ));
    }

    statements.push(format!("DROP TABLE {}", quote(name)));
    statements.push(format!(
        "ALTER TABLE {} RENAME TO {}",
        quote(&staging),
        quote(name)
    ));
    for index in new_table.effective_indexes() {
        statements.push(create_index_sql(name, &index, quote));
    }
    statements.push("COMMIT".to_string());
    statements.push("PRAGMA foreign_keys=ON".to_string());

    finish_statements(statements)
}

fn create_table_stmt(table: &Table, physical_name: &str) -> String {
    let auto = rules::auto_increment_pk(table);
    let pk_count = table.primary_key_columns().len();

    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            if auto.as_ref().map(|a| a.column.as_str()) == Some(column.name.as_str()) {
                // Rowid alias; no NOT NULL, no default, no declared width.
                format!("{} INTEGER PRIMARY KEY", quote(&column.name))
            } else {
                let mut sql = render_plain_column(column);
                if column.primary_key && pk_count == 1 {
                    sql.push_str(" PRIMARY KEY");
                }
                sql
            }
        })
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
        quote(physical_name),
        lines.join(",\n    ")
    )
}

/// Renders `name type [NOT NULL] [DEFAULT ...] [REFERENCES ...]`.
fn render_plain_column(column: &ColumnDef) -> String {
    let mut sql = format!("{} {}", quote(&column.name), type_name(column.ty));
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(raw) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_literal(raw, column.ty, BoolStyle::Numeric));
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

/// SQLite folds the semantic types onto its four storage classes.
fn type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Integer | ColumnType::BigInt | ColumnType::Boolean => "INTEGER",
        ColumnType::String
        | ColumnType::Text
        | ColumnType::DateTime
        | ColumnType::Timestamp
        | ColumnType::Json => "TEXT",
        ColumnType::Float | ColumnType::Decimal => "REAL",
        ColumnType::Binary => "BLOB",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portsql_core::builder::TableBuilder;
    use pretty_assertions::assert_eq;

    fn pets() -> Table {
        let mut tb = TableBuilder::new("pets");
        tb.bigint("id").primary_key();
        tb.string("name");
        tb.boolean("active").default_value("true");
        tb.build().unwrap()
    }

    #[test]
    fn create_table_uses_rowid_alias() {
        let sql = create_table(&pets());
        assert_eq!(
            sql,
            "CREATE TABLE \"pets\" (\n    \
             \"id\" INTEGER PRIMARY KEY,\n    \
             \"name\" TEXT NOT NULL,\n    \
             \"active\" INTEGER NOT NULL DEFAULT 1\n);"
        );
    }

    #[test]
    fn bigint_pk_still_renders_integer_primary_key() {
        let mut tb = TableBuilder::new("t");
        tb.bigint("id").primary_key().default_value("42");
        tb.string("x");
        let sql = create_table(&tb.build().unwrap());

        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY"));
        assert!(!sql.contains("NOT NULL AUTO"));
        assert!(!sql.contains("AUTOINCREMENT"));
        assert!(!sql.contains("DEFAULT 42"));
    }

    #[test]
    fn composite_pk_is_table_level() {
        let mut tb = TableBuilder::new("pairs");
        tb.bigint("a").primary_key();
        tb.bigint("b").primary_key();
        let sql = create_table(&tb.build().unwrap());

        assert!(sql.contains("\"a\" INTEGER NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (\"a\", \"b\")"));
        assert!(!sql.contains("AUTOINCREMENT"));
    }

    #[test]
    fn native_alter_operations() {
        let sql = alter_table(
            "users",
            &[
                TableOp::AddColumn(ColumnDef::new("email", ColumnType::String)),
                TableOp::RenameColumn {
                    from: "email".into(),
                    to: "mail".into(),
                },
                TableOp::DropColumn {
                    column: "mail".into(),
                },
            ],
            None,
        );
        assert_eq!(
            sql,
            "ALTER TABLE \"users\" ADD COLUMN \"email\" TEXT NOT NULL;\n\
             ALTER TABLE \"users\" RENAME COLUMN \"email\" TO \"mail\";\n\
             ALTER TABLE \"users\" DROP COLUMN \"mail\";"
        );
    }

    #[test]
    fn rebuild_without_current_table_is_a_comment() {
        let sql = alter_table(
            "users",
            &[TableOp::ChangeNullable {
                column: "name".into(),
                nullable: true,
            }],
            None,
        );
        assert!(sql.starts_with("--"));
        assert!(sql.contains("table rebuild"));
    }

    #[test]
    fn rebuild_script_shape() {
        let table = pets();
        let sql = alter_table(
            "pets",
            &[TableOp::ChangeNullable {
                column: "name".into(),
                nullable: true,
            }],
            Some(&table),
        );

        let expected = "PRAGMA foreign_keys=OFF;\n\
             BEGIN;\n\
             CREATE TABLE \"pets_new\" (\n    \
             \"id\" INTEGER PRIMARY KEY,\n    \
             \"name\" TEXT,\n    \
             \"active\" INTEGER NOT NULL DEFAULT 1\n);\n\
             INSERT INTO \"pets_new\" (\"id\", \"name\", \"active\") \
             SELECT \"id\", \"name\", \"active\" FROM \"pets\";\n\
             DROP TABLE \"pets\";\n\
             ALTER TABLE \"pets_new\" RENAME TO \"pets\";\n\
             COMMIT;\n\
             PRAGMA foreign_keys=ON;";
        assert_eq!(sql, expected);
    }

    #[test]
    fn rebuild_copy_list_follows_renames_and_drops() {
        let table = pets();
        let sql = alter_table(
            "pets",
            &[
                TableOp::RenameColumn {
                    from: "name".into(),
                    to: "label".into(),
                },
                TableOp::ChangeDefault {
                    column: "label".into(),
                    default: Some("unnamed".into()),
                },
                TableOp::DropColumn {
                    column: "active".into(),
                },
            ],
            Some(&table),
        );

        assert!(sql.contains(
            "INSERT INTO \"pets_new\" (\"id\", \"label\") SELECT \"id\", \"name\" FROM \"pets\""
        ));
        assert!(sql.contains("\"label\" TEXT NOT NULL DEFAULT 'unnamed'"));
        assert!(!sql.contains("\"active\""));
    }

    #[test]
    fn rebuild_recreates_indexes_after_rename() {
        let mut tb = TableBuilder::new("users");
        tb.bigint("id").primary_key();
        tb.string("email").unique();
        let table = tb.build().unwrap();

        let sql = alter_table(
            "users",
            &[TableOp::ChangeNullable {
                column: "email".into(),
                nullable: true,
            }],
            Some(&table),
        );

        let rename_pos = sql.find("RENAME TO \"users\"").unwrap();
        let index_pos = sql
            .find("CREATE UNIQUE INDEX \"idx_users_email\" ON \"users\" (\"email\")")
            .unwrap();
        assert!(index_pos > rename_pos, "indexes must follow the rename: {sql}");
    }

    #[test]
    fn rename_index_drops_and_recreates() {
        let mut tb = TableBuilder::new("users");
        tb.bigint("id").primary_key();
        tb.string("email");
        tb.add_unique_index(&["email"]);
        let table = tb.build().unwrap();

        let sql = alter_table(
            "users",
            &[TableOp::RenameIndex {
                from: "idx_users_email".into(),
                to: "idx_users_mail".into(),
            }],
            Some(&table),
        );
        assert_eq!(
            sql,
            "DROP INDEX \"idx_users_email\";\n\
             CREATE UNIQUE INDEX \"idx_users_mail\" ON \"users\" (\"email\");"
        );
    }

    #[test]
    fn added_unique_column_gets_index_statement() {
        let mut def = ColumnDef::new("email", ColumnType::String);
        def.unique().nullable();
        let sql = alter_table("users", &[TableOp::AddColumn(def)], None);
        assert_eq!(
            sql,
            "ALTER TABLE \"users\" ADD COLUMN \"email\" TEXT;\n\
             CREATE UNIQUE INDEX \"idx_users_email\" ON \"users\" (\"email\");"
        );
    }

    #[test]
    fn drop_index_statement() {
        let sql = alter_table(
            "users",
            &[TableOp::DropIndex {
                name: "idx_users_email".into(),
            }],
            None,
        );
        assert_eq!(sql, "DROP INDEX \"idx_users_email\";");
    }

    #[test]
    fn drop_table_statement() {
        assert_eq!(drop_table("pets"), "DROP TABLE \"pets\";");
    }
}
