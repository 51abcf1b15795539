use serde::{Deserialize, Serialize};

use super::Cents;

/// A single recorded expense. Records are write-once: the ledger hands out
/// shared references only, so an appended expense never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub description: String,
    pub amount_cents: Cents,
    /// Grouping key for totals, compared verbatim (case-sensitive, untrimmed).
    pub category: String,
}

impl Expense {
    pub fn new(
        description: impl Into<String>,
        amount_cents: Cents,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount_cents,
            category: category.into(),
        }
    }
}
