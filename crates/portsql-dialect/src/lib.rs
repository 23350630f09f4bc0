//! Dialect-specific SQL emission.
//!
//! Three independent emitters -- [`postgres`], [`mysql`], [`sqlite`] -- share
//! one interface (create table, alter table, drop table) and agree on
//! observable semantics despite the underlying type-system differences.
//! Dispatch is by the [`Dialect`] enum, never by inheritance; the emitters
//! hold no state.

pub mod mysql;
pub mod postgres;
mod render;
pub mod script;
pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use portsql_core::ops::TableOp;
use portsql_core::table::Table;

/// A dialect identifier outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported dialect: {0}")]
pub struct DialectError(pub String);

/// The target SQL flavor.
///
/// Identified everywhere by the exact strings `postgres`, `mysql`, `sqlite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    Mysql,
    Sqlite,
}

impl Dialect {
    /// All supported dialects, in instruction order.
    pub const ALL: [Dialect; 3] = [Dialect::Postgres, Dialect::Mysql, Dialect::Sqlite];

    /// Returns the canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Emits the `CREATE TABLE` script for a table, index statements included.
    pub fn create_table(&self, table: &Table) -> String {
        match self {
            Self::Postgres => postgres::create_table(table),
            Self::Mysql => mysql::create_table(table),
            Self::Sqlite => sqlite::create_table(table),
        }
    }

    /// Emits the `ALTER TABLE` script for a sequence of operations.
    ///
    /// `current` is the pre-change table definition; SQLite needs it for the
    /// table rebuild and MySQL for `MODIFY`, and both fall back to an emitted
    /// comment without it.
    pub fn alter_table(&self, name: &str, ops: &[TableOp], current: Option<&Table>) -> String {
        match self {
            Self::Postgres => postgres::alter_table(name, ops, current),
            Self::Mysql => mysql::alter_table(name, ops, current),
            Self::Sqlite => sqlite::alter_table(name, ops, current),
        }
    }

    /// Emits the `DROP TABLE` statement.
    pub fn drop_table(&self, name: &str) -> String {
        match self {
            Self::Postgres => postgres::drop_table(name),
            Self::Mysql => mysql::drop_table(name),
            Self::Sqlite => sqlite::drop_table(name),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(DialectError(other.to_string())),
        }
    }
}

impl Serialize for Dialect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
