use std::collections::HashMap;

use super::{Cents, Expense};

/// Sum amounts per exact category string, in record order.
/// Sums saturate at the `Cents` bounds instead of overflowing.
pub fn compute_category_totals(records: &[Expense]) -> HashMap<String, Cents> {
    let mut totals: HashMap<String, Cents> = HashMap::new();

    for expense in records {
        let total = totals.entry(expense.category.clone()).or_insert(0);
        *total = total.saturating_add(expense.amount_cents);
    }

    totals
}

/// The in-memory, ordered list of expenses.
///
/// Insertion order is preserved and duplicates are allowed. Totals are
/// computed on demand rather than maintained alongside the records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<Expense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from a previously persisted sequence.
    pub fn from_records(records: Vec<Expense>) -> Self {
        Self { records }
    }

    /// Append a new expense. Any description, category or amount is accepted.
    pub fn append(
        &mut self,
        description: impl Into<String>,
        amount_cents: Cents,
        category: impl Into<String>,
    ) -> Expense {
        let expense = Expense::new(description, amount_cents, category);
        self.records.push(expense.clone());
        expense
    }

    pub fn list(&self) -> &[Expense] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn totals_by_category(&self) -> HashMap<String, Cents> {
        compute_category_totals(&self.records)
    }

    /// Sum of every recorded amount, saturating at the `Cents` bounds.
    pub fn total(&self) -> Cents {
        self.records
            .iter()
            .fold(0, |total: Cents, e| total.saturating_add(e.amount_cents))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
