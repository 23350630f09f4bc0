//! The `_portsql_migrations` bookkeeping table.
//!
//! One row per applied migration: `{version, name, applied_at}`. The unique
//! key is the full name, not the version; two migrations may share a
//! wall-clock second as long as their names differ.

use tracing::debug;

use portsql_dialect::Dialect;

use crate::error::Result;
use crate::traits::{Database, DbExecutor};

/// Name of the tracking table.
pub const TRACKING_TABLE: &str = "_portsql_migrations";

fn quote(dialect: Dialect, ident: &str) -> String {
    match dialect {
        Dialect::Mysql => format!("`{ident}`"),
        Dialect::Postgres | Dialect::Sqlite => format!("\"{ident}\""),
    }
}

fn escape(literal: &str) -> String {
    literal.replace('\'', "''")
}

/// The `CREATE TABLE IF NOT EXISTS` statement for the given dialect.
pub fn ensure_sql(dialect: Dialect) -> String {
    let table = quote(dialect, TRACKING_TABLE);
    match dialect {
        Dialect::Postgres => format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
             \"version\" VARCHAR(14) NOT NULL,\n    \
             \"name\" VARCHAR(255) NOT NULL UNIQUE,\n    \
             \"applied_at\" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()\n)"
        ),
        Dialect::Mysql => format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
             `version` VARCHAR(14) NOT NULL,\n    \
             `name` VARCHAR(255) NOT NULL UNIQUE,\n    \
             `applied_at` TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        ),
        Dialect::Sqlite => format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
             \"version\" TEXT NOT NULL,\n    \
             \"name\" TEXT NOT NULL UNIQUE,\n    \
             \"applied_at\" TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))\n)"
        ),
    }
}

/// Creates the tracking table if it does not exist. Idempotent.
pub fn ensure(db: &mut dyn Database) -> Result<()> {
    let sql = ensure_sql(db.dialect());
    db.execute(&sql)
}

/// Inserts one tracking row inside the caller's transaction.
pub fn record(tx: &mut dyn DbExecutor, dialect: Dialect, version: &str, name: &str) -> Result<()> {
    debug!(name, "recording migration");
    tx.execute(&format!(
        "INSERT INTO {} ({}, {}) VALUES ('{}', '{}')",
        quote(dialect, TRACKING_TABLE),
        quote(dialect, "version"),
        quote(dialect, "name"),
        escape(version),
        escape(name)
    ))
}

/// Returns every applied migration name, ordered by `(version, name)`.
pub fn applied(db: &mut dyn Database) -> Result<Vec<String>> {
    let dialect = db.dialect();
    let rows = db.query_rows(&format!(
        "SELECT {name} FROM {table} ORDER BY {version}, {name}",
        name = quote(dialect, "name"),
        table = quote(dialect, TRACKING_TABLE),
        version = quote(dialect, "version"),
    ))?;
    Ok(rows.into_iter().filter_map(|mut r| r.pop()).collect())
}

/// Returns the names of all user tables, tracking table included.
pub fn all_tables(db: &mut dyn Database) -> Result<Vec<String>> {
    let sql = match db.dialect() {
        Dialect::Postgres => {
            "SELECT tablename FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename"
        }
        Dialect::Mysql => {
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = DATABASE() ORDER BY table_name"
        }
        Dialect::Sqlite => {
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name"
        }
    };
    let rows = db.query_rows(sql)?;
    Ok(rows.into_iter().filter_map(|mut r| r.pop()).collect())
}

/// Drops every user table, tracking table included. Tear-down convenience.
pub fn drop_all(db: &mut dyn Database) -> Result<()> {
    let dialect = db.dialect();
    let tables = all_tables(db)?;
    debug!(count = tables.len(), "dropping all tables");

    if dialect == Dialect::Mysql {
        db.execute("SET FOREIGN_KEY_CHECKS=0")?;
    }
    if dialect == Dialect::Sqlite {
        db.execute("PRAGMA foreign_keys=OFF")?;
    }

    for table in &tables {
        let stmt = match dialect {
            Dialect::Postgres => format!("DROP TABLE IF EXISTS {} CASCADE", quote(dialect, table)),
            _ => format!("DROP TABLE IF EXISTS {}", quote(dialect, table)),
        };
        db.execute(&stmt)?;
    }

    if dialect == Dialect::Mysql {
        db.execute("SET FOREIGN_KEY_CHECKS=1")?;
    }
    if dialect == Dialect::Sqlite {
        db.execute("PRAGMA foreign_keys=ON")?;
    }
    Ok(())
}
