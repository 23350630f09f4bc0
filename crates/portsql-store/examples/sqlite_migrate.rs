//! Builds a small plan and applies it to a temporary SQLite database.
//!
//! Run with `cargo run --example sqlite_migrate` and watch the tracing
//! output for the migration log.

use anyhow::Result;

use portsql_core::column::{ColumnType, TableRef};
use portsql_plan::Plan;
use portsql_store::{run, tracking, DbExecutor, SqliteDb};

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("demo.db");

    let mut plan = Plan::new("demo");
    plan.add_empty_table("pets", |t| {
        t.bigint("id").primary_key();
        t.string("name");
        t.boolean("active").default_value("true");
    })?;
    plan.add_empty_table("tags", |t| {
        t.bigint("id").primary_key();
        t.string("label").unique();
    })?;
    plan.add_empty_table("pet_tags", |t| {
        t.junction_table();
        t.bigint("pet_id").primary_key().references(TableRef::new("pets"));
        t.bigint("tag_id").primary_key().references(TableRef::new("tags"));
    })?;
    plan.update_table("pets", |t| {
        t.add_column("nickname", ColumnType::String).nullable();
        Ok(())
    })?;

    println!("--- plan ---\n{}", plan.to_json()?);

    let mut db = SqliteDb::open(&path)?;
    run(&mut db, &plan, "sqlite")?;

    db.execute("INSERT INTO \"pets\" (\"name\") VALUES ('fluffy')")?;
    let rows = db.query_rows("SELECT \"id\", \"name\", \"active\" FROM \"pets\"")?;
    println!("--- pets ---\n{rows:?}");

    println!("--- applied ---");
    for name in tracking::applied(&mut db)? {
        println!("{name}");
    }

    Ok(())
}
