//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention:
//! - `migration_NN_up.sql` - Upgrades schema from version `NN-1` to version `NN`
//! - `migration_NN_down.sql` - Downgrades schema from version `NN` to version `NN-1`

use anyhow::{bail, Context, Result};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

/// A database migration with up and down SQL.
struct Migration {
    /// The version this migration brings the database to (when going up).
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// Creates the `schema_version` table if needed and returns the recorded version. A fresh
/// database reports version 0.
pub(crate) async fn current_version(pool: &SqlitePool) -> Result<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;

    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;

    match row.0 {
        Some(version) => Ok(version),
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
                .execute(pool)
                .await
                .context("Failed to insert initial schema version")?;
            Ok(0)
        }
    }
}

/// One SQL script to apply and the version it leaves the schema at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    label: &'static str,
    sql: &'static str,
    lands_on: i32,
}

/// Works out which scripts take the schema from `from` to `to`, in order. Fails before anything
/// runs if one of them does not exist.
fn plan(from: i32, to: i32) -> Result<Vec<Step>> {
    let step = |version: i32, upgrade: bool| -> Result<Step> {
        let Some(m) = MIGRATIONS.iter().find(|m| m.version == version) else {
            bail!("No migration {version:02} is available to go from schema {from} to {to}")
        };
        Ok(if upgrade {
            Step {
                label: "up",
                sql: m.up_sql,
                lands_on: version,
            }
        } else {
            Step {
                label: "down",
                sql: m.down_sql,
                lands_on: version - 1,
            }
        })
    };

    if from <= to {
        (from + 1..=to).map(|v| step(v, true)).collect()
    } else {
        (to + 1..=from).rev().map(|v| step(v, false)).collect()
    }
}

/// Moves the schema from `from` to `to`, upgrading or downgrading as needed. Each script runs in
/// its own transaction together with the `schema_version` update.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Result<()> {
    let steps = plan(from, to)?;
    if steps.is_empty() {
        debug!("Schema is at version {to}; nothing to migrate");
        return Ok(());
    }

    for step in steps {
        debug!("Applying {} migration, schema -> {}", step.label, step.lands_on);
        apply(pool, step).await?;
    }
    debug!("Schema migrated from version {from} to {to}");
    Ok(())
}

async fn apply(pool: &SqlitePool, step: Step) -> Result<()> {
    let mut tx = pool.begin().await.context("Unable to start a migration")?;

    tx.execute(step.sql).await.with_context(|| {
        format!(
            "The {} migration to schema {} failed",
            step.label, step.lands_on
        )
    })?;
    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(step.lands_on)
        .execute(&mut *tx)
        .await
        .context("Unable to record the schema version")?;

    tx.commit().await.context("Unable to commit a migration")
}
