use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Cents;

/// Per-category totals arranged for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    /// Sorted by category name.
    pub categories: Vec<CategorySummary>,
    pub total: Cents,
    pub expense_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    /// Share of the overall total, 0.0 when the overall total is zero.
    pub percentage: f64,
}

impl CategoryReport {
    pub fn from_aggregates(totals: HashMap<String, Cents>, counts: HashMap<String, usize>) -> Self {
        let total = totals
            .values()
            .fold(0, |sum: Cents, t| sum.saturating_add(*t));
        let expense_count = counts.values().sum();

        let mut categories: Vec<CategorySummary> = totals
            .into_iter()
            .map(|(category, cat_total)| {
                let count = counts.get(&category).copied().unwrap_or(0);
                let percentage = if total == 0 {
                    0.0
                } else {
                    cat_total as f64 / total as f64 * 100.0
                };
                CategorySummary {
                    category,
                    total: cat_total,
                    count,
                    percentage,
                }
            })
            .collect();
        categories.sort_by(|a, b| a.category.cmp(&b.category));

        Self {
            categories,
            total,
            expense_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expense_count == 0
    }
}
