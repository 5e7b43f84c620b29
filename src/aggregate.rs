//! Totals over a filtered set of expenses.

use crate::model::{Amount, ExpenseRecord};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// The sum of every amount in `records`. Zero when `records` is empty. Saturates rather than
/// overflowing.
pub fn total(records: &[ExpenseRecord]) -> Amount {
    records.iter().map(|r| r.amount()).sum()
}

/// The per-category sums of `records`.
pub fn category_totals(records: &[ExpenseRecord]) -> CategoryTotals {
    records
        .iter()
        .map(|r| (r.category().to_string(), r.amount()))
        .collect()
}

/// One category and the sum of its amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

/// Category sums in the order each category first appears in the input.
///
/// Only categories that occur in the input are present; none maps to zero.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(Vec<CategoryTotal>);

impl CategoryTotals {
    pub fn add(&mut self, category: impl AsRef<str>, amount: Amount) {
        let category = category.as_ref();
        match self.0.iter_mut().find(|e| e.category == category) {
            Some(entry) => entry.total += amount,
            None => self.0.push(CategoryTotal {
                category: category.to_string(),
                total: amount,
            }),
        }
    }

    pub fn get(&self, category: &str) -> Option<Amount> {
        self.0
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.total)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> + '_ {
        self.0.iter()
    }

    /// The sum across all categories.
    pub fn sum(&self) -> Amount {
        self.0.iter().map(|e| e.total).sum()
    }

    /// Projects the totals into `{label, value}` pairs for a chart, in the same order.
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.0
            .iter()
            .map(|e| ChartPoint {
                label: e.category.clone(),
                value: e.total.value().to_f64().unwrap_or_default(),
            })
            .collect()
    }
}

impl<S> FromIterator<(S, Amount)> for CategoryTotals
where
    S: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = (S, Amount)>>(iter: T) -> Self {
        let mut totals = CategoryTotals::default();
        for (category, amount) in iter {
            totals.add(category, amount);
        }
        totals
    }
}

/// A single slice of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}
