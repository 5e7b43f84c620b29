use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The identifier SQLite assigns to an expense row.
pub type ExpenseId = i64;

/// The date format used for the `date` column, e.g. `2024-03-15`.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// One recorded spending event, as it exists in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseRecord {
    pub(crate) id: ExpenseId,
    pub(crate) amount: Amount,
    pub(crate) category: String,
    pub(crate) note: Option<String>,
    pub(crate) date: NaiveDate,
}

impl ExpenseRecord {
    pub fn new(
        id: ExpenseId,
        amount: Amount,
        category: impl Into<String>,
        note: Option<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            amount,
            category: category.into(),
            note,
            date,
        }
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A validated expense that has not been stored yet. It has no `id` because the store assigns
/// one on insert.
///
/// Only the ledger controller builds these from user input, after checking that the amount is
/// positive and the category is not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub(crate) amount: Amount,
    pub(crate) category: String,
    pub(crate) note: Option<String>,
    pub(crate) date: NaiveDate,
}

impl NewExpense {
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Trims a note, mapping blank input to `None`.
pub(crate) fn normalize_note(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
