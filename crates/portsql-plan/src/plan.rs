//! The [`Plan`] and its operations.

use serde::{Deserialize, Serialize};

use portsql_core::builder::{AlterTableBuilder, TableBuilder};
use portsql_core::error::SchemaError;
use portsql_core::name;
use portsql_core::ops::{self, TableOp};
use portsql_core::rules;
use portsql_core::table::Table;
use portsql_dialect::Dialect;

use crate::error::{PlanError, Result};
use crate::migration::{Migration, MigrationInstructions};
use crate::schema::Schema;

/// The evolving schema plus the append-only migration log.
///
/// The plan exclusively owns both; tables handed out by accessors are
/// read-only from the caller's viewpoint, and every mutation goes through
/// the operations below. Each successful operation appends exactly one
/// migration carrying the SQL for all three dialects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Plan {
    schema: Schema,
    migrations: Vec<Migration>,
}

impl Plan {
    /// Creates an empty plan with the given schema name.
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema: Schema::new(schema_name),
            migrations: Vec::new(),
        }
    }

    // -- Accessors -----------------------------------------------------------

    /// The current schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The migration log, in append order.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Returns the named table, or [`PlanError::UnknownTable`].
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.schema
            .table(name)
            .ok_or_else(|| PlanError::UnknownTable(name.to_string()))
    }

    /// The tables eligible for CRUD generation (standard tables).
    pub fn crud_tables(&self) -> Vec<&Table> {
        rules::crud_tables(self.schema.tables.values())
    }

    // -- Operations ----------------------------------------------------------

    /// Creates a table from scratch; the closure declares its columns.
    ///
    /// Appends a `<timestamp>_create_<name>` migration. Junction tables are
    /// validated here: exactly two reference columns or the whole operation
    /// is rejected and the plan stays untouched.
    pub fn add_empty_table(
        &mut self,
        name: &str,
        build: impl FnOnce(&mut TableBuilder),
    ) -> Result<()> {
        self.insert_table(TableBuilder::new(name), name, build)
    }

    /// Creates a table with the standard columns prepended
    /// (`id`, `public_id`, `created_at`, `updated_at`, `deleted_at`).
    pub fn add_table(&mut self, name: &str, build: impl FnOnce(&mut TableBuilder)) -> Result<()> {
        self.insert_table(TableBuilder::with_standard_columns(name), name, build)
    }

    fn insert_table(
        &mut self,
        mut builder: TableBuilder,
        name: &str,
        build: impl FnOnce(&mut TableBuilder),
    ) -> Result<()> {
        if self.schema.has_table(name) {
            return Err(PlanError::DuplicateTable(name.to_string()));
        }

        build(&mut builder);
        let table = builder.build()?;

        let instructions = MigrationInstructions {
            postgres: Dialect::Postgres.create_table(&table),
            mysql: Dialect::Mysql.create_table(&table),
            sqlite: Dialect::Sqlite.create_table(&table),
        };
        let migration_name = format!("{}_create_{name}", self.next_prefix());

        self.migrations.push(Migration::new(migration_name, instructions));
        self.schema.tables.insert(name.to_string(), table);
        Ok(())
    }

    /// Alters an existing table; the closure declares the operations.
    ///
    /// The full operation sequence is validated against a copy of the table
    /// before anything is mutated, then applied to the schema, and one
    /// `<timestamp>_alter_<name>_table` migration is appended. A closure
    /// that declares no operations is a no-op.
    pub fn update_table<F>(&mut self, name: &str, alter: F) -> Result<()>
    where
        F: FnOnce(&mut AlterTableBuilder<'_>) -> std::result::Result<(), SchemaError>,
    {
        let current = self.table(name)?.clone();

        let mut builder = AlterTableBuilder::new(&current);
        alter(&mut builder)?;
        let ops: Vec<TableOp> = builder.into_ops();
        if ops.is_empty() {
            return Ok(());
        }

        let next = ops::apply_ops(&current, &ops)?;

        let instructions = MigrationInstructions {
            postgres: Dialect::Postgres.alter_table(name, &ops, Some(&current)),
            mysql: Dialect::Mysql.alter_table(name, &ops, Some(&current)),
            sqlite: Dialect::Sqlite.alter_table(name, &ops, Some(&current)),
        };
        let migration_name = format!("{}_alter_{name}_table", self.next_prefix());

        self.migrations.push(Migration::new(migration_name, instructions));
        self.schema.tables.insert(name.to_string(), next);
        Ok(())
    }

    /// Drops an existing table and appends a `<timestamp>_drop_<name>_table`
    /// migration.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if !self.schema.has_table(name) {
            return Err(PlanError::UnknownTable(name.to_string()));
        }

        let instructions = MigrationInstructions {
            postgres: Dialect::Postgres.drop_table(name),
            mysql: Dialect::Mysql.drop_table(name),
            sqlite: Dialect::Sqlite.drop_table(name),
        };
        let migration_name = format!("{}_drop_{name}_table", self.next_prefix());

        self.migrations.push(Migration::new(migration_name, instructions));
        self.schema.tables.remove(name);
        Ok(())
    }

    /// Appends an externally produced migration without validating it.
    ///
    /// The runner re-validates names and ordering, so plans assembled from
    /// other sources fail there, not here.
    pub fn push_migration(&mut self, migration: Migration) {
        self.migrations.push(migration);
    }

    // -- Validation ----------------------------------------------------------

    /// Checks every migration name and the strict ascending order.
    pub fn validate(&self) -> Result<()> {
        let mut previous: Option<&str> = None;
        for migration in &self.migrations {
            name::validate_migration_name(&migration.name)?;
            if let Some(prev) = previous {
                if migration.name.as_str() <= prev {
                    return Err(PlanError::OutOfOrder {
                        previous: prev.to_string(),
                        name: migration.name.clone(),
                    });
                }
            }
            previous = Some(&migration.name);
        }
        Ok(())
    }

    // -- Persistence ---------------------------------------------------------

    /// Serializes to canonical indented JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a plan from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The next strictly increasing 14-digit prefix.
    ///
    /// Wall-clock UTC, bumped past the previous migration's prefix when two
    /// operations land within the same second, so an in-process plan always
    /// satisfies the runner's ordering rule.
    fn next_prefix(&self) -> String {
        let now = name::timestamp_prefix();
        match self.migrations.last() {
            Some(last) if now.as_str() <= last.version() => name::bump_prefix(last.version()),
            _ => now,
        }
    }
}
