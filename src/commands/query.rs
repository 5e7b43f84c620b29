//! Read-only commands: listing expenses and summarizing them.

use crate::aggregate::{CategoryTotals, ChartPoint};
use crate::args::WindowArgs;
use crate::commands::{session, Out};
use crate::ledger::LedgerView;
use crate::model::{Amount, FilterWindow};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

/// The totals for one window, plus the chart projection of the category totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub window: FilterWindow,
    pub total_spend: Amount,
    pub by_category: CategoryTotals,
    pub chart: Vec<ChartPoint>,
}

/// Lists the expenses in `args.window()`, newest first, followed by the total.
pub async fn list(config: Config, args: WindowArgs) -> Result<Out<LedgerView>> {
    let mut ledger = session(&config).await?;
    ledger.set_window(args.window());
    let view = ledger.view().clone();

    let mut message = String::new();
    if view.visible_records.is_empty() {
        message.push_str("No expenses yet.\n");
    }
    for record in &view.visible_records {
        let _ = write!(
            message,
            "{:>5}  {}  {:>12}  {}",
            record.id(),
            record.date(),
            record.amount().to_string(),
            record.category()
        );
        if let Some(note) = record.note() {
            let _ = write!(message, "  ({note})");
        }
        message.push('\n');
    }
    let _ = write!(
        message,
        "Total spending ({}): {}",
        view.window, view.total_spend
    );
    Ok(Out::new(message, view))
}

/// Totals the expenses in `args.window()` by category.
pub async fn summary(config: Config, args: WindowArgs) -> Result<Out<Summary>> {
    let mut ledger = session(&config).await?;
    ledger.set_window(args.window());

    let summary = Summary {
        window: ledger.window(),
        total_spend: ledger.total_spend(),
        by_category: ledger.by_category().clone(),
        chart: ledger.by_category().chart_points(),
    };

    let mut message = format!(
        "Total spending ({}): {}",
        summary.window, summary.total_spend
    );
    if summary.by_category.is_empty() {
        message.push_str("\nNo data to display yet.");
    }
    for entry in summary.by_category.iter() {
        let _ = write!(message, "\n  {}: {}", entry.category, entry.total);
    }
    Ok(Out::new(message, summary))
}
