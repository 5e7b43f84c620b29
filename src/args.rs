//! These structs provide the CLI interface for the ledger CLI.

use crate::model::{ExpenseId, FilterWindow};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: record what you spend and see where it went.
///
/// Expenses are kept in a SQLite database inside the ledger home directory. Each expense has an
/// amount, a category, an optional note and the date it was recorded. You can list them for all
/// time, the current week (starting Sunday) or the current month, along with totals per category.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home directory, its config file and an empty database.
    ///
    /// Run this once before any other command. By default the ledger lives in $HOME/ledger; pass
    /// --ledger-home or set LEDGER_HOME to put it somewhere else.
    Init,
    /// Record a new expense dated today.
    ///
    /// The amount must be a number greater than zero and at most one trillion. It may include a
    /// leading dollar sign and comma thousands separators. The category must not be blank.
    Insert(InsertArgs),
    /// List expenses in a time window, newest first.
    List(WindowArgs),
    /// Show the total and per-category spending in a time window.
    Summary(WindowArgs),
    /// Delete an expense by id.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger database and configuration are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// How much was spent, e.g. 12.50 or $1,250.00
    #[arg(long)]
    amount: String,

    /// What it was spent on, e.g. Food, Books, Rent
    #[arg(long)]
    category: String,

    /// An optional free-form note
    #[arg(long, default_value = "")]
    note: String,
}

impl InsertArgs {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            note: note.into(),
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// Args for the `ledger list` and `ledger summary` commands.
#[derive(Debug, Parser, Clone, Default)]
pub struct WindowArgs {
    /// The time window: all, this-week or this-month
    #[arg(long, value_enum, default_value_t = FilterWindow::All)]
    window: FilterWindow,
}

impl WindowArgs {
    pub fn new(window: FilterWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> FilterWindow {
        self.window
    }
}

/// Args for the `ledger delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the expense, as shown by `ledger list`
    id: ExpenseId,
}

impl DeleteArgs {
    pub fn new(id: ExpenseId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
