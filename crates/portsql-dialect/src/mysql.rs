//! MySQL emitter.
//!
//! Backtick quoting, InnoDB/utf8mb4 table options, `AUTO_INCREMENT` for the
//! eligible primary key. MySQL ignores column-level references clauses, so
//! foreign keys render as table-level `FOREIGN KEY` clauses, and `DEFAULT`
//! is never emitted on TEXT, JSON, or BLOB columns.
//!
//! `ADD COLUMN` for a NOT NULL column needs an explicit default on non-empty
//! tables; callers either make the column nullable or provide one. The
//! emitter renders what it is given.

use portsql_core::column::{ColumnDef, ColumnType};
use portsql_core::ops::TableOp;
use portsql_core::rules;
use portsql_core::table::Table;

use crate::render::{
    column_flag_index, create_index_sql, default_literal, finish_statements, infer_literal,
    quote_backtick as quote, BoolStyle,
};

/// Table options appended to every table definition.
const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

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
/// Type and nullability changes render as `MODIFY` and need the full column
/// definition, so they fall back to an emitted comment when `current` is
/// absent.
pub fn alter_table(name: &str, ops: &[TableOp], current: Option<&Table>) -> String {
    let mut statements = Vec::new();

    for op in ops {
        match op {
            TableOp::AddColumn(def) => {
                statements.push(format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    quote(name),
                    render_column_def(def)
                ));
                if let Some(target) = &def.references {
                    statements.push(format!(
                        "ALTER TABLE {} ADD FOREIGN KEY ({}) REFERENCES {} ({})",
                        quote(name),
                        quote(&def.name),
                        quote(&target.table),
                        quote(&target.column)
                    ));
                }
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

            TableOp::ChangeType { column, .. } | TableOp::ChangeNullable { column, .. } => {
                match modified_column(current, ops, column) {
                    Some(def) => statements.push(format!(
                        "ALTER TABLE {} MODIFY {}",
                        quote(name),
                        render_column_def(&def)
                    )),
                    None => statements.push(format!(
                        "-- ALTER TABLE {} MODIFY {}: current table definition required",
                        quote(name),
                        quote(column)
                    )),
                }
            }

            TableOp::ChangeDefault { column, default } => match default {
                Some(raw) => {
                    let literal = match current.and_then(|t| t.column(column)) {
                        Some(def) => default_literal(raw, def.ty, BoolStyle::Numeric),
                        None => infer_literal(raw, BoolStyle::Numeric),
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
                statements.push(format!("DROP INDEX {} ON {}", quote(index), quote(name)));
            }

            TableOp::RenameIndex { from, to } => {
                statements.push(format!(
                    "ALTER TABLE {} RENAME INDEX {} TO {}",
                    quote(name),
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
        .map(|column| {
            if auto.as_ref().map(|a| a.column.as_str()) == Some(column.name.as_str()) {
                // Declared defaults never render on the auto-increment key.
                format!(
                    "{} {} NOT NULL AUTO_INCREMENT PRIMARY KEY",
                    quote(&column.name),
                    column_type_name(column)
                )
            } else {
                let mut sql = render_column_def(column);
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

    for column in &table.columns {
        if let Some(target) = &column.references {
            lines.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quote(&column.name),
                quote(&target.table),
                quote(&target.column)
            ));
        }
    }

    format!(
        "CREATE TABLE {} (\n    {}\n) {TABLE_OPTIONS}",
        quote(&table.name),
        lines.join(",\n    ")
    )
}

/// Renders `name type [NOT NULL] [DEFAULT ...]`, without key clauses.
fn render_column_def(column: &ColumnDef) -> String {
    let mut sql = format!("{} {}", quote(&column.name), column_type_name(column));
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(raw) = &column.default {
        if !suppresses_default(column.ty) {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default_literal(raw, column.ty, BoolStyle::Numeric));
        }
    }
    sql
}

/// MySQL cannot attach defaults to these column classes.
fn suppresses_default(ty: ColumnType) -> bool {
    matches!(ty, ColumnType::Text | ColumnType::Json | ColumnType::Binary)
}

/// The column definition after applying every change op targeting it.
///
/// `MODIFY` replaces the whole definition, so a type change must not lose a
/// nullability change from the same batch (and vice versa).
fn modified_column(current: Option<&Table>, ops: &[TableOp], column: &str) -> Option<ColumnDef> {
    let mut def = current?.column(column)?.clone();
    for op in ops {
        match op {
            TableOp::ChangeType {
                column: target,
                ty,
                length,
                precision,
                scale,
            } if target == column => {
                def.ty = *ty;
                def.length = *length;
                def.precision = *precision;
                def.scale = *scale;
            }
            TableOp::ChangeNullable {
                column: target,
                nullable,
            } if target == column => {
                def.nullable = *nullable;
            }
            _ => {}
        }
    }
    Some(def)
}

fn column_type_name(column: &ColumnDef) -> String {
    match column.ty {
        ColumnType::Integer => "INT".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::String => format!("VARCHAR({})", column.length.unwrap_or(255)),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Boolean => "TINYINT(1)".to_string(),
        ColumnType::Float => "DOUBLE".to_string(),
        ColumnType::Decimal => match (column.precision, column.scale) {
            (Some(p), Some(s)) => format!("DECIMAL({p},{s})"),
            _ => "DECIMAL".to_string(),
        },
        ColumnType::DateTime => "DATETIME".to_string(),
        ColumnType::Timestamp => "TIMESTAMP".to_string(),
        ColumnType::Binary => "BLOB".to_string(),
        ColumnType::Json => "JSON".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portsql_core::builder::TableBuilder;
    use portsql_core::column::TableRef;
    use portsql_core::table::IndexDef;
    use pretty_assertions::assert_eq;

    fn pets() -> Table {
        let mut tb = TableBuilder::new("pets");
        tb.bigint("id").primary_key();
        tb.string("name");
        tb.boolean("active").default_value("true");
        tb.build().unwrap()
    }

    #[test]
    fn create_table_with_auto_increment() {
        let sql = create_table(&pets());
        assert_eq!(
            sql,
            "CREATE TABLE `pets` (\n    \
             `id` BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,\n    \
             `name` VARCHAR(255) NOT NULL,\n    \
             `active` TINYINT(1) NOT NULL DEFAULT 1\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;"
        );
    }

    #[test]
    fn auto_increment_suppresses_declared_default() {
        let mut tb = TableBuilder::new("t");
        tb.bigint("id").primary_key().default_value("42");
        tb.string("x");
        let sql = create_table(&tb.build().unwrap());

        assert!(sql.contains("AUTO_INCREMENT"));
        assert!(!sql.contains("DEFAULT 42"));
    }

    #[test]
    fn composite_pk_has_no_auto_increment() {
        let mut tb = TableBuilder::new("pairs");
        tb.bigint("a").primary_key();
        tb.bigint("b").primary_key();
        let sql = create_table(&tb.build().unwrap());

        assert!(!sql.contains("AUTO_INCREMENT"));
        assert!(sql.contains("PRIMARY KEY (`a`, `b`)"));
    }

    #[test]
    fn datetime_and_timestamp_stay_distinct() {
        let mut tb = TableBuilder::new("t");
        tb.bigint("id").primary_key();
        tb.datetime("created_at");
        tb.timestamp("seen_at");
        let sql = create_table(&tb.build().unwrap());

        assert!(sql.contains("`created_at` DATETIME NOT NULL"));
        assert!(sql.contains("`seen_at` TIMESTAMP NOT NULL"));
    }

    #[test]
    fn no_default_on_text_json_blob() {
        let mut tb = TableBuilder::new("t");
        tb.bigint("id").primary_key();
        tb.text("body").default_value("hello");
        tb.json("meta").default_value("{}");
        tb.binary("blob").default_value("x");
        let sql = create_table(&tb.build().unwrap());

        assert!(!sql.contains("DEFAULT"), "unexpected DEFAULT in {sql}");
    }

    #[test]
    fn references_render_as_table_level_foreign_keys() {
        let mut tb = TableBuilder::new("pet_tags");
        tb.junction_table();
        tb.bigint("pet_id").primary_key().references(TableRef::new("pets"));
        tb.bigint("tag_id").primary_key().references(TableRef::new("tags"));
        let sql = create_table(&tb.build().unwrap());

        assert!(sql.contains("FOREIGN KEY (`pet_id`) REFERENCES `pets` (`id`)"));
        assert!(sql.contains("FOREIGN KEY (`tag_id`) REFERENCES `tags` (`id`)"));
        assert!(sql.contains("PRIMARY KEY (`pet_id`, `tag_id`)"));
        assert!(!sql.contains("AUTO_INCREMENT"));
    }

    #[test]
    fn modify_combines_type_and_nullability_changes() {
        let table = pets();
        let sql = alter_table(
            "pets",
            &[
                TableOp::ChangeType {
                    column: "name".into(),
                    ty: ColumnType::Text,
                    length: None,
                    precision: None,
                    scale: None,
                },
                TableOp::ChangeNullable {
                    column: "name".into(),
                    nullable: true,
                },
            ],
            Some(&table),
        );
        assert_eq!(
            sql,
            "ALTER TABLE `pets` MODIFY `name` TEXT;\n\
             ALTER TABLE `pets` MODIFY `name` TEXT;"
        );
    }

    #[test]
    fn modify_without_current_table_is_a_comment() {
        let sql = alter_table(
            "pets",
            &[TableOp::ChangeNullable {
                column: "name".into(),
                nullable: true,
            }],
            None,
        );
        assert_eq!(
            sql,
            "-- ALTER TABLE `pets` MODIFY `name`: current table definition required;"
        );
    }

    #[test]
    fn alter_default_set_and_drop() {
        let table = pets();
        let set = alter_table(
            "pets",
            &[TableOp::ChangeDefault {
                column: "active".into(),
                default: Some("false".into()),
            }],
            Some(&table),
        );
        assert_eq!(set, "ALTER TABLE `pets` ALTER COLUMN `active` SET DEFAULT 0;");

        let drop = alter_table(
            "pets",
            &[TableOp::ChangeDefault {
                column: "active".into(),
                default: None,
            }],
            Some(&table),
        );
        assert_eq!(drop, "ALTER TABLE `pets` ALTER COLUMN `active` DROP DEFAULT;");
    }

    #[test]
    fn index_operations_use_mysql_forms() {
        let sql = alter_table(
            "pets",
            &[
                TableOp::AddIndex(IndexDef::derived("pets", &["name"], true)),
                TableOp::RenameIndex {
                    from: "idx_pets_name".into(),
                    to: "idx_pets_label".into(),
                },
                TableOp::DropIndex {
                    name: "idx_pets_label".into(),
                },
            ],
            None,
        );
        assert_eq!(
            sql,
            "CREATE UNIQUE INDEX `idx_pets_name` ON `pets` (`name`);\n\
             ALTER TABLE `pets` RENAME INDEX `idx_pets_name` TO `idx_pets_label`;\n\
             DROP INDEX `idx_pets_label` ON `pets`;"
        );
    }

    #[test]
    fn drop_table_statement() {
        assert_eq!(drop_table("pets"), "DROP TABLE `pets`;");
    }
}
