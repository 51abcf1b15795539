use anyhow::Result;
use std::io::Read;

use crate::application::ExpenseService;
use crate::domain::{parse_amount, Expense};

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred on one input row
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Importer for appending CSV rows to the ledger
pub struct Importer<'a> {
    service: &'a mut ExpenseService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a mut ExpenseService) -> Self {
        Self { service }
    }

    /// Import expenses from CSV with a `description,amount,category` header.
    ///
    /// Rows are validated one at a time: a bad row is reported and skipped,
    /// the rest are appended in file order.
    pub fn import_expenses_csv<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        // Flexible so a short row is reported by the field check below
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut parsed = Vec::new();
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let (Some(description), Some(amount), Some(category)) =
                (record.get(0), record.get(1), record.get(2))
            else {
                errors.push(ImportError {
                    line,
                    error: "expected description, amount and category".to_string(),
                });
                continue;
            };

            match parse_amount(amount) {
                Ok(amount_cents) => parsed.push(Expense::new(description, amount_cents, category)),
                Err(e) => errors.push(ImportError {
                    line,
                    error: format!("Invalid amount: {}", e),
                }),
            }
        }

        let imported = parsed.len();
        if !options.dry_run {
            for expense in parsed {
                self.service
                    .record_expense(expense.description, expense.amount_cents, expense.category);
            }
        }

        Ok(ImportResult { imported, errors })
    }
}
