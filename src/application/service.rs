use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{parse_amount, Cents, Expense, Ledger};
use crate::storage::{self, Restored};

use super::{AppError, CategoryReport};

/// What happened when the save file was read at startup (or on reload).
/// Every variant other than `Loaded` leaves the service with an empty ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded(usize),
    NotFound,
    Unreadable(String),
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded(_))
    }
}

/// Application service owning the ledger and the file it is saved to.
/// This is the primary interface for any client (CLI, TUI, GUI, etc.).
pub struct ExpenseService {
    ledger: Ledger,
    path: PathBuf,
}

impl ExpenseService {
    /// Create a service with an empty ledger, without touching the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            ledger: Ledger::new(),
            path: path.into(),
        }
    }

    /// Create a service and immediately restore from `path`.
    pub fn open(path: impl Into<PathBuf>) -> (Self, LoadStatus) {
        let mut service = Self::new(path);
        let status = service.reload();
        (service, status)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ========================
    // Persistence
    // ========================

    /// Replace the in-memory ledger with the contents of the save file.
    /// Load failures of any kind leave the ledger empty.
    pub fn reload(&mut self) -> LoadStatus {
        match storage::restore(&self.path) {
            Restored::Loaded(records) => {
                let count = records.len();
                self.ledger = Ledger::from_records(records);
                LoadStatus::Loaded(count)
            }
            Restored::NotFound => {
                self.ledger = Ledger::new();
                tracing::debug!(path = %self.path.display(), "no save file yet");
                LoadStatus::NotFound
            }
            Restored::Unreadable(reason) => {
                self.ledger = Ledger::new();
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "Save file is unreadable. Starting with an empty list."
                );
                LoadStatus::Unreadable(reason)
            }
        }
    }

    /// Write the current ledger to the save file. A failure leaves the
    /// in-memory records untouched.
    pub fn save(&self) -> Result<(), AppError> {
        storage::save(&self.path, self.ledger.list())?;
        Ok(())
    }

    // ========================
    // Expense operations
    // ========================

    /// Parse `amount` and record a new expense.
    /// An unparseable amount is rejected before the ledger is touched.
    pub fn add_expense(
        &mut self,
        description: &str,
        amount: &str,
        category: &str,
    ) -> Result<Expense, AppError> {
        let amount_cents = parse_amount(amount)?;
        Ok(self.record_expense(description, amount_cents, category))
    }

    /// Record an expense whose amount is already in cents.
    pub fn record_expense(
        &mut self,
        description: impl Into<String>,
        amount_cents: Cents,
        category: impl Into<String>,
    ) -> Expense {
        let expense = self.ledger.append(description, amount_cents, category);
        tracing::debug!(
            category = %expense.category,
            amount_cents = expense.amount_cents,
            "recorded expense"
        );
        expense
    }

    pub fn list_expenses(&self) -> &[Expense] {
        self.ledger.list()
    }

    pub fn category_totals(&self) -> HashMap<String, Cents> {
        self.ledger.totals_by_category()
    }

    pub fn category_report(&self) -> CategoryReport {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for expense in self.ledger.list() {
            *counts.entry(expense.category.clone()).or_insert(0) += 1;
        }
        CategoryReport::from_aggregates(self.ledger.totals_by_category(), counts)
    }

    pub fn total(&self) -> Cents {
        self.ledger.total()
    }

    /// Remove every expense. Returns how many were removed.
    /// Confirmation, if any, is up to the caller.
    pub fn clear_expenses(&mut self) -> usize {
        let removed = self.ledger.len();
        self.ledger.clear();
        tracing::debug!(removed, "cleared expenses");
        removed
    }
}
