//! Migrations -- named bundles of per-dialect SQL.

use serde::{Deserialize, Serialize};

use portsql_core::name;
use portsql_dialect::Dialect;

/// The rendered SQL for one migration, one script per dialect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrationInstructions {
    #[serde(rename = "Postgres")]
    pub postgres: String,
    #[serde(rename = "MySQL")]
    pub mysql: String,
    #[serde(rename = "Sqlite")]
    pub sqlite: String,
}

impl MigrationInstructions {
    /// Returns the script for the given dialect.
    pub fn for_dialect(&self, dialect: Dialect) -> &str {
        match dialect {
            Dialect::Postgres => &self.postgres,
            Dialect::Mysql => &self.mysql,
            Dialect::Sqlite => &self.sqlite,
        }
    }
}

/// One entry of the migration log.
///
/// The name matches `^\d{14}_[A-Za-z0-9_]+$`; its 14-digit prefix is the
/// lexicographic ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Migration {
    pub name: String,
    pub instructions: MigrationInstructions,
}

impl Migration {
    /// Creates a migration from a name and its rendered instructions.
    pub fn new(name: impl Into<String>, instructions: MigrationInstructions) -> Self {
        Self {
            name: name.into(),
            instructions,
        }
    }

    /// The 14-digit timestamp prefix of the name.
    pub fn version(&self) -> &str {
        name::version_of(&self.name)
    }
}
