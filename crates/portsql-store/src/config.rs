//! Connection configuration.
//!
//! A small YAML file (dialect + URL) plus environment overrides, and the
//! [`open`] factory that turns a config into a live [`Database`].
//!
//! ```yaml
//! dialect: sqlite
//! url: ./app.db
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use portsql_dialect::{Dialect, DialectError};

use crate::error::StoreError;
use crate::mysql::MysqlDb;
use crate::postgres::PostgresDb;
use crate::sqlite::SqliteDb;
use crate::traits::Database;

/// Environment variable overriding the configured dialect.
pub const ENV_DIALECT: &str = "PORTSQL_DIALECT";
/// Environment variable overriding the configured URL.
pub const ENV_URL: &str = "PORTSQL_DATABASE_URL";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file contained invalid YAML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The dialect identifier is not one of `postgres`, `mysql`, `sqlite`.
    #[error(transparent)]
    Dialect(#[from] DialectError),
}

/// How to reach the target database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectConfig {
    /// The target dialect.
    pub dialect: Dialect,
    /// Driver URL, or a filesystem path / `:memory:` for SQLite.
    #[serde(default)]
    pub url: String,
}

impl ConnectConfig {
    /// Creates a config for the given dialect and URL.
    pub fn new(dialect: Dialect, url: impl Into<String>) -> Self {
        Self {
            dialect,
            url: url.into(),
        }
    }
}

/// Loads a config from a YAML file, then applies environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConnectConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let mut config: ConnectConfig = serde_yaml::from_str(&contents)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Saves a config as YAML.
pub fn save_config(config: &ConnectConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

fn apply_env_overrides(config: &mut ConnectConfig) -> Result<(), ConfigError> {
    if let Ok(dialect) = std::env::var(ENV_DIALECT) {
        config.dialect = dialect.parse()?;
    }
    if let Ok(url) = std::env::var(ENV_URL) {
        config.url = url;
    }
    Ok(())
}

/// Opens a database connection for the configured dialect.
pub fn open(config: &ConnectConfig) -> Result<Box<dyn Database>, StoreError> {
    match config.dialect {
        Dialect::Sqlite => {
            let db = if config.url.is_empty() || config.url == ":memory:" {
                SqliteDb::open_in_memory()?
            } else {
                SqliteDb::open(&config.url)?
            };
            Ok(Box::new(db))
        }
        Dialect::Postgres => Ok(Box::new(PostgresDb::connect(&config.url)?)),
        Dialect::Mysql => Ok(Box::new(MysqlDb::connect(&config.url)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portsql.yaml");

        let config = ConnectConfig::new(Dialect::Sqlite, ":memory:");
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn parses_dialect_strings() {
        let config: ConnectConfig =
            serde_yaml::from_str("dialect: postgres\nurl: postgres://localhost/app\n").unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);

        let err = serde_yaml::from_str::<ConnectConfig>("dialect: oracle\n");
        assert!(err.is_err());
    }

    #[test]
    fn open_in_memory_sqlite() {
        let config = ConnectConfig::new(Dialect::Sqlite, ":memory:");
        let mut db = open(&config).unwrap();
        db.execute("CREATE TABLE t (x INTEGER)").unwrap();
        assert_eq!(db.dialect(), Dialect::Sqlite);
    }
}
