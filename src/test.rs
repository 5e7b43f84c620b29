//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::clock::FixedClock;
use crate::ledger::Ledger;
use crate::model::{Amount, ExpenseId, NewExpense};
use crate::store::ExpenseStore;
use crate::{Config, Db};
use chrono::NaiveDate;
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a ledger home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    today: NaiveDate,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database. The environment's
    /// "today" is Friday 2024-03-15.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledger");
        let config = Config::create(&root).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
            today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn db(&self) -> &Db {
        self.config.db()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Returns a started ledger session over this environment's database, pinned to `today`.
    pub async fn ledger(&self) -> Ledger<Db> {
        let mut ledger = Ledger::with_clock(self.db().clone(), FixedClock::new(self.today));
        ledger.start().await.unwrap();
        ledger
    }

    /// Writes an expense dated `today` straight to the database and returns its id.
    pub async fn insert_test_expense(&self, amount: &str, category: &str, note: &str) -> ExpenseId {
        let expense = NewExpense {
            amount: Amount::from_str(amount).unwrap(),
            category: category.to_string(),
            note: crate::model::normalize_note(note),
            date: self.today,
        };
        self.db().create(&expense).await.unwrap()
    }
}
