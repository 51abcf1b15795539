use anyhow::Result;
use std::io::Write;

use crate::application::{CategoryReport, ExpenseService};
use crate::domain::format_cents;
use crate::storage::LedgerSnapshot;

/// Exporter for converting ledger data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Export expenses to CSV, one row per expense in recorded order
    pub fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let expenses = self.service.list_expenses();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["description", "amount", "category"])?;

        for expense in expenses {
            csv_writer.write_record([
                expense.description.as_str(),
                &format_cents(expense.amount_cents),
                expense.category.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(expenses.len())
    }

    /// Export per-category totals to CSV
    pub fn export_summary_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let report = self.service.category_report();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["category", "count", "total", "percentage"])?;

        for summary in &report.categories {
            csv_writer.write_record([
                summary.category.as_str(),
                &summary.count.to_string(),
                &format_cents(summary.total),
                &format!("{:.2}", summary.percentage),
            ])?;
        }

        csv_writer.flush()?;
        Ok(report.categories.len())
    }

    /// Export the expense list as a JSON array
    pub fn export_expenses_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let expenses = self.service.list_expenses();
        serde_json::to_writer_pretty(&mut writer, expenses)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(expenses.len())
    }

    /// Export per-category totals as JSON
    pub fn export_summary_json<W: Write>(&self, mut writer: W) -> Result<CategoryReport> {
        let report = self.service.category_report();
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(report)
    }

    /// Export the full ledger in the same shape as the save file
    pub fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot::new(self.service.list_expenses().to_vec());
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(snapshot)
    }
}
