//! [`SqliteDb`] -- rusqlite-backed [`Database`] implementation.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::{debug, info};

use portsql_dialect::Dialect;

use crate::error::{Result, StoreError};
use crate::traits::{Database, DbExecutor};

/// SQLite-backed database connection.
pub struct SqliteDb {
    conn: Connection,
}

impl SqliteDb {
    /// Opens (or creates) a SQLite database at the given path.
    ///
    /// Enables WAL mode and foreign keys and sets a busy timeout.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(?path, "opening SQLite database");

        let conn = Connection::open(path).map_err(|e| {
            StoreError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;
        configure(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory SQLite database");
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Connection(format!("failed to open in-memory db: {e}")))?;
        configure(&conn)?;
        Ok(Self { conn })
    }
}

/// Sets connection pragmas (WAL mode, foreign keys, busy timeout).
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|e| StoreError::Connection(format!("failed to set pragmas: {e}")))
}

fn execute_on(conn: &Connection, sql: &str) -> Result<()> {
    conn.execute_batch(sql)
        .map_err(|e| StoreError::Query(e.to_string()))
}

fn query_on(conn: &Connection, sql: &str) -> Result<Vec<Vec<String>>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| StoreError::Query(e.to_string()))?;
    let column_count = stmt.column_count();

    let mut rows = stmt
        .query([])
        .map_err(|e| StoreError::Query(e.to_string()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| StoreError::Query(e.to_string()))? {
        let mut record = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value = match row
                .get_ref(i)
                .map_err(|e| StoreError::Query(e.to_string()))?
            {
                ValueRef::Null => String::new(),
                ValueRef::Integer(v) => v.to_string(),
                ValueRef::Real(v) => v.to_string(),
                ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
                ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
            };
            record.push(value);
        }
        out.push(record);
    }
    Ok(out)
}

impl DbExecutor for SqliteDb {
    fn execute(&mut self, sql: &str) -> Result<()> {
        execute_on(&self.conn, sql)
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        query_on(&self.conn, sql)
    }
}

/// Executor view of a connection with an active transaction.
struct SqliteTx<'a> {
    conn: &'a Connection,
}

impl DbExecutor for SqliteTx<'_> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        execute_on(self.conn, sql)
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        query_on(self.conn, sql)
    }
}

impl Database for SqliteDb {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn DbExecutor) -> Result<()>,
    ) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        let mut exec = SqliteTx { conn: &tx };
        match f(&mut exec) {
            Ok(()) => tx
                .commit()
                .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}"))),
            Err(e) => {
                // Transaction is rolled back on drop.
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for SqliteDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDb").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_and_query() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (x INTEGER, y TEXT)").unwrap();
        db.execute("INSERT INTO t (x, y) VALUES (1, 'one')").unwrap();

        let rows = db.query_rows("SELECT x, y FROM t").unwrap();
        assert_eq!(rows, vec![vec!["1".to_string(), "one".to_string()]]);
    }

    #[test]
    fn transaction_commits_on_ok() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (x INTEGER)").unwrap();

        db.with_transaction(&mut |tx| tx.execute("INSERT INTO t (x) VALUES (1)"))
            .unwrap();

        let rows = db.query_rows("SELECT COUNT(*) FROM t").unwrap();
        assert_eq!(rows[0][0], "1");
    }

    #[test]
    fn transaction_rolls_back_on_err() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (x INTEGER)").unwrap();

        let result = db.with_transaction(&mut |tx| {
            tx.execute("INSERT INTO t (x) VALUES (1)")?;
            Err(StoreError::Internal("forced".into()))
        });
        assert!(result.is_err());

        let rows = db.query_rows("SELECT COUNT(*) FROM t").unwrap();
        assert_eq!(rows[0][0], "0");
    }

    #[test]
    fn open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let mut db = SqliteDb::open(&path).unwrap();
        db.execute("CREATE TABLE t (x INTEGER)").unwrap();
        assert!(path.exists());
    }
}
