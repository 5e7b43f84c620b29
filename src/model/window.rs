use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The time range that narrows which expenses are visible.
///
/// The textual forms are `all`, `this-week` and `this-month`. The short forms `week` and `month`
/// are accepted when parsing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FilterWindow {
    /// Every expense.
    #[default]
    All,
    /// Expenses dated on or after the most recent Sunday.
    #[serde(alias = "week")]
    #[value(alias = "week")]
    ThisWeek,
    /// Expenses dated in the current calendar month.
    #[serde(alias = "month")]
    #[value(alias = "month")]
    ThisMonth,
}

serde_plain::derive_display_from_serialize!(FilterWindow);
serde_plain::derive_fromstr_from_deserialize!(FilterWindow, |e| -> UnhandledFilterWindow {
    UnhandledFilterWindow::new(e.to_string())
});

/// Raised when a window name does not match any `FilterWindow`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledFilterWindow(String);

impl UnhandledFilterWindow {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The parser's description of the problem.
    pub fn detail(&self) -> &str {
        &self.0
    }
}

impl Display for UnhandledFilterWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unrecognized filter window ({}); expected one of all, this-week, this-month",
            self.0
        )
    }
}

impl std::error::Error for UnhandledFilterWindow {}
