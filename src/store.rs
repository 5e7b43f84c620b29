//! The persistence seam used by the ledger controller.

use crate::model::{ExpenseId, ExpenseRecord, NewExpense};
use anyhow::Result;
use async_trait::async_trait;

/// Durable storage for expense records.
///
/// Each method is one atomic statement against the backing medium, so a failed call leaves no
/// partial write behind.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Makes sure the schema exists. Safe to call on every startup.
    async fn initialize(&self) -> Result<()>;

    /// Inserts `expense` and returns the id assigned to it.
    async fn create(&self, expense: &NewExpense) -> Result<ExpenseId>;

    /// Every stored record, newest id first.
    async fn list_all(&self) -> Result<Vec<ExpenseRecord>>;

    /// Removes the record with `id`. Removing an id that does not exist is not an error.
    async fn delete_by_id(&self, id: ExpenseId) -> Result<()>;
}
