//! This module is responsible for reading, writing and managing the SQLite database

mod migrations;

use crate::model::{Amount, ExpenseId, ExpenseRecord, NewExpense, DATE_FORMAT};
use crate::store::ExpenseStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

/// The row shape of the `expenses` table: `(id, amount, category, note, date)`.
type ExpenseRow = (i64, f64, String, Option<String>, String);

/// The SQLite-backed `ExpenseStore`.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Opens the SQLite file at `path`, creating it if it does not exist
    /// - Returns a `Db` whose schema has not been checked yet; call `initialize` before use
    pub(crate) async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .context("Failed to parse SQLite connection string")?
            .create_if_missing(true);

        // One connection: every statement from this process is serialized.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite database at {}", path.display()))?;

        debug!("Opened SQLite database at {}", path.display());
        Ok(Self { pool })
    }

    /// Opens the database at `path` and brings its schema up to date.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::open(path).await?;
        db.initialize().await?;
        Ok(db)
    }

    /// Returns the number of rows in the expenses table.
    #[cfg(test)]
    pub(crate) async fn count_expenses(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count expenses")?;
        Ok(u64::try_from(row.0).unwrap_or_default())
    }

    /// Fetches a single expense by id.
    #[cfg(test)]
    pub(crate) async fn _get_expense(&self, id: ExpenseId) -> Result<Option<ExpenseRecord>> {
        let row: Option<ExpenseRow> = sqlx::query_as(
            "SELECT id, amount, category, note, date FROM expenses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query expense")?;
        row.map(record_from_row).transpose()
    }

    /// Closes the connection pool. Later operations fail.
    #[cfg(test)]
    pub(crate) async fn _close(&self) {
        self.pool.close().await
    }
}

#[async_trait]
impl ExpenseStore for Db {
    async fn initialize(&self) -> Result<()> {
        let version = migrations::current_version(&self.pool).await?;
        migrations::run(&self.pool, version, migrations::CURRENT_VERSION)
            .await
            .context("Unable to migrate the database schema")
    }

    async fn create(&self, expense: &NewExpense) -> Result<ExpenseId> {
        let date = expense.date().format(DATE_FORMAT).to_string();
        let amount = expense
            .amount()
            .to_f64()
            .with_context(|| format!("Amount {} cannot be stored", expense.amount()))?;
        let result =
            sqlx::query("INSERT INTO expenses (amount, category, note, date) VALUES (?, ?, ?, ?)")
                .bind(amount)
                .bind(expense.category())
                .bind(expense.note())
                .bind(date.as_str())
                .execute(&self.pool)
                .await
                .context("Failed to insert expense")?;

        let id = result.last_insert_rowid();
        debug!(
            "Inserted expense {id}: {} '{}' on {date}",
            expense.amount(),
            expense.category()
        );
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<ExpenseRecord>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            "SELECT id, amount, category, note, date FROM expenses ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        trace!("Loaded {} expense rows", rows.len());
        rows.into_iter().map(record_from_row).collect()
    }

    async fn delete_by_id(&self, id: ExpenseId) -> Result<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete expense {id}"))?;

        if result.rows_affected() == 0 {
            debug!("No expense with id {id}; nothing deleted");
        } else {
            debug!("Deleted expense {id}");
        }
        Ok(())
    }
}

fn record_from_row(row: ExpenseRow) -> Result<ExpenseRecord> {
    let (id, amount, category, note, date) = row;
    let amount = Amount::from_f64(amount)
        .with_context(|| format!("Expense {id} has an unreadable amount {amount}"))?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .with_context(|| format!("Expense {id} has an invalid date '{date}'"))?;
    Ok(ExpenseRecord::new(id, amount, category, note, date))
}
