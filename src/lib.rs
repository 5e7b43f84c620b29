//! A personal expense ledger.
//!
//! Expenses are stored in a local SQLite database. A [`Ledger`] session validates new entries,
//! writes them through to an [`ExpenseStore`], and keeps a derived view of the records in the
//! selected [`model::FilterWindow`] together with their total and per-category totals.

pub mod aggregate;
pub mod args;
pub mod clock;
pub mod commands;
mod config;
mod db;
mod error;
pub mod filter;
pub mod ledger;
pub mod model;
mod store;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use db::Db;
pub use error::{Error, ErrorType, Result};
pub use ledger::{Ledger, LedgerView, Outcome, Rejection, SessionState};
pub use store::ExpenseStore;
