//! Types that represent the core data model, such as `ExpenseRecord` and `FilterWindow`.
mod amount;
mod expense;
mod window;

pub use amount::{Amount, AmountError};
pub(crate) use expense::{normalize_note, DATE_FORMAT};
pub use expense::{ExpenseId, ExpenseRecord, NewExpense};
pub use window::{FilterWindow, UnhandledFilterWindow};
