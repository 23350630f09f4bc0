//! The migration runner.
//!
//! Validates the plan's ordering, consults the tracking store, and applies
//! each unapplied migration in its own transaction. Forward-only: there is
//! no rollback of applied migrations.

use std::collections::BTreeSet;

use tracing::{debug, info};

use portsql_dialect::script::{is_transaction_control, split_statements};
use portsql_dialect::Dialect;
use portsql_plan::Plan;

use crate::cancel::CancelToken;
use crate::error::{Result, StoreError};
use crate::tracking;
use crate::traits::Database;

/// Options for a run. The default has no cancellation token armed.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Checked at statement boundaries; see [`CancelToken`].
    pub cancel: CancelToken,
}

/// Applies the plan's pending migrations to the database.
///
/// `dialect` must be one of the exact strings `postgres`, `mysql`,
/// `sqlite`; anything else is rejected before touching the database.
pub fn run(db: &mut dyn Database, plan: &Plan, dialect: &str) -> Result<()> {
    let dialect: Dialect = dialect.parse()?;
    run_with(db, plan, dialect, &RunOptions::default())
}

/// [`run`] with an explicit dialect and options.
///
/// Sequence: validate names and strict ascending order, ensure the tracking
/// table, read the applied set, then apply each unapplied migration in plan
/// order inside its own transaction (statements split at top-level `;`,
/// tracking row inserted in the same transaction). The first failure rolls
/// back the current migration and aborts the run; earlier migrations keep
/// their committed state.
pub fn run_with(
    db: &mut dyn Database,
    plan: &Plan,
    dialect: Dialect,
    options: &RunOptions,
) -> Result<()> {
    plan.validate()?;

    tracking::ensure(db)?;
    let applied: BTreeSet<String> = tracking::applied(db)?.into_iter().collect();

    for migration in plan.migrations() {
        if applied.contains(&migration.name) {
            debug!(name = %migration.name, "migration already applied, skipping");
            continue;
        }

        let sql = migration.instructions.for_dialect(dialect);
        let statements = split_statements(sql);
        info!(name = %migration.name, statements = statements.len(), "applying migration");

        db.with_transaction(&mut |tx| {
            for statement in &statements {
                if options.cancel.is_cancelled() {
                    return Err(StoreError::Cancelled {
                        name: migration.name.clone(),
                    });
                }
                // Emitted scripts may carry their own BEGIN/COMMIT so they
                // stay runnable standalone; this transaction owns atomicity.
                if is_transaction_control(statement) {
                    continue;
                }
                tx.execute(statement).map_err(|e| StoreError::Migration {
                    name: migration.name.clone(),
                    reason: format!("{e}\nStatement: {}", truncate(statement, 120)),
                })?;
            }
            tracking::record(tx, dialect, migration.version(), &migration.name)
        })?;
    }

    Ok(())
}

/// Truncates a statement for error messages.
fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        format!("{}...", &s[..max])
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteDb;
    use portsql_plan::{Migration, MigrationInstructions};

    fn sqlite_only(name: &str, sql: &str) -> Migration {
        Migration::new(
            name,
            MigrationInstructions {
                postgres: String::new(),
                mysql: String::new(),
                sqlite: sql.to_string(),
            },
        )
    }

    #[test]
    fn unknown_dialect_rejected_before_validation() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        let plan = Plan::new("app");
        let err = run(&mut db, &plan, "oracle").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedDialect(_)));
    }

    #[test]
    fn out_of_order_plan_touches_nothing() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        let mut plan = Plan::new("app");
        plan.push_migration(sqlite_only(
            "20260111170700_second",
            "CREATE TABLE \"b\" (\"x\" INTEGER);",
        ));
        plan.push_migration(sqlite_only(
            "20260111170656_first",
            "CREATE TABLE \"a\" (\"x\" INTEGER);",
        ));

        let err = run(&mut db, &plan, "sqlite").unwrap_err();
        assert!(err.to_string().contains("order"));

        // Neither the tracking table nor any migration table was created.
        assert_eq!(tracking::all_tables(&mut db).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn cancelled_run_rolls_back_current_migration() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        let mut plan = Plan::new("app");
        plan.push_migration(sqlite_only(
            "20260111170656_create_a",
            "CREATE TABLE \"a\" (\"x\" INTEGER);",
        ));

        let options = RunOptions::default();
        options.cancel.cancel();
        let err = run_with(&mut db, &plan, Dialect::Sqlite, &options).unwrap_err();
        assert!(err.is_cancelled());

        assert_eq!(tracking::applied(&mut db).unwrap(), Vec::<String>::new());
        let tables = tracking::all_tables(&mut db).unwrap();
        assert!(!tables.contains(&"a".to_string()));
    }
}
