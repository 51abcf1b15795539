use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::application::{ExpenseService, LoadStatus};
use crate::domain::{format_cents, Cents};
use crate::io::Exporter;
use crate::storage::DEFAULT_FILE_NAME;

/// Expense Tracker - record expenses and see totals per category
#[derive(Parser, Debug)]
#[command(name = "expense-tracker")]
#[command(about = "A single-user expense tracker with per-category totals")]
#[command(version)]
pub struct Cli {
    /// Save file path
    #[arg(short, long, env = "EXPENSES_FILE", default_value = DEFAULT_FILE_NAME)]
    pub file: PathBuf,

    /// Currency symbol printed in front of amounts
    #[arg(long, env = "EXPENSES_CURRENCY", default_value = "₹")]
    pub currency: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record an expense and save
    Add {
        /// What the money was spent on
        description: String,

        /// Amount (e.g., "4.50" or "12"); negative values are allowed
        #[arg(allow_negative_numbers = true)]
        amount: String,

        /// Category used to group totals (exact match)
        category: String,
    },

    /// List all expenses in the order they were recorded
    List {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show total expenses by category
    Summary {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Remove every expense and save
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Write the current expenses to the save file
    Save,

    /// Export data to CSV or JSON
    Export {
        /// What to export: expenses, summary, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format: csv, json (default: csv, json for full)
        #[arg(long)]
        format: Option<String>,
    },

    /// Import expenses from a description,amount,category CSV
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let (mut service, status) = ExpenseService::open(&self.file);
        if let Some(notice) = load_notice(&status) {
            eprintln!("{}", notice);
        }

        let mut out = io::stdout().lock();

        match self.command {
            Commands::Add {
                description,
                amount,
                category,
            } => {
                run_add_command(
                    &mut service,
                    &mut out,
                    &self.currency,
                    &description,
                    &amount,
                    &category,
                )?;
            }

            Commands::List { format } => {
                render_expenses(&mut out, &service, &self.currency, &format)?;
            }

            Commands::Summary { format } => {
                render_summary(&mut out, &service, &self.currency, &format)?;
            }

            Commands::Clear { yes } => {
                run_clear_command(&mut service, io::stdin().lock(), &mut out, yes)?;
            }

            Commands::Save => {
                run_save_command(&service, &mut out)?;
            }

            Commands::Export {
                export_type,
                output,
                format,
            } => {
                run_export_command(&service, &export_type, output, format.as_deref())?;
            }

            Commands::Import { input, dry_run } => {
                run_import_command(&mut service, &mut out, input, dry_run)?;
            }
        }

        Ok(())
    }
}

/// Message shown when the save file gave us nothing to start from.
pub fn load_notice(status: &LoadStatus) -> Option<&'static str> {
    match status {
        LoadStatus::Loaded(_) => None,
        LoadStatus::NotFound | LoadStatus::Unreadable(_) => {
            Some("No expenses found. Starting with an empty list.")
        }
    }
}

/// Ask a yes/no question; anything but "y" or "yes" counts as no.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, mut input: R, mut output: W) -> io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Prefix an amount with the currency symbol, keeping the sign in front.
pub fn format_amount(currency: &str, cents: Cents) -> String {
    let formatted = format_cents(cents);
    match formatted.strip_prefix('-') {
        Some(magnitude) => format!("-{}{}", currency, magnitude),
        None => format!("{}{}", currency, formatted),
    }
}

pub fn render_expenses<W: Write>(
    out: &mut W,
    service: &ExpenseService,
    currency: &str,
    format: &str,
) -> Result<()> {
    match format {
        "json" => {
            Exporter::new(service).export_expenses_json(out)?;
        }
        "csv" => {
            Exporter::new(service).export_expenses_csv(out)?;
        }
        "table" => {
            let expenses = service.list_expenses();
            if expenses.is_empty() {
                writeln!(out, "No expenses recorded yet.")?;
                return Ok(());
            }
            writeln!(out, "{:<30} {:>14} CATEGORY", "DESCRIPTION", "AMOUNT")?;
            writeln!(out, "{}", "-".repeat(60))?;
            for expense in expenses {
                writeln!(
                    out,
                    "{:<30} {:>14} {}",
                    truncate(&expense.description, 30),
                    format_amount(currency, expense.amount_cents),
                    truncate(&expense.category, 20)
                )?;
            }
        }
        other => anyhow::bail!("Invalid format '{}'. Valid formats: table, json, csv", other),
    }
    Ok(())
}

pub fn render_summary<W: Write>(
    out: &mut W,
    service: &ExpenseService,
    currency: &str,
    format: &str,
) -> Result<()> {
    match format {
        "json" => {
            Exporter::new(service).export_summary_json(out)?;
        }
        "csv" => {
            Exporter::new(service).export_summary_csv(out)?;
        }
        "table" => {
            let report = service.category_report();
            if report.is_empty() {
                writeln!(out, "No expenses recorded yet.")?;
                return Ok(());
            }
            writeln!(out, "Total Expenses by Category")?;
            writeln!(out)?;
            writeln!(out, "{:<25} {:>6} {:>14} {:>7}", "CATEGORY", "COUNT", "TOTAL", "SHARE")?;
            writeln!(out, "{}", "-".repeat(55))?;
            for summary in &report.categories {
                writeln!(
                    out,
                    "{:<25} {:>6} {:>14} {:>6.1}%",
                    truncate(&summary.category, 25),
                    summary.count,
                    format_amount(currency, summary.total),
                    summary.percentage
                )?;
            }
            writeln!(out, "{}", "-".repeat(55))?;
            writeln!(
                out,
                "{:<25} {:>6} {:>14}",
                "Total",
                report.expense_count,
                format_amount(currency, report.total)
            )?;
        }
        other => anyhow::bail!("Invalid format '{}'. Valid formats: table, json, csv", other),
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn run_add_command<W: Write>(
    service: &mut ExpenseService,
    out: &mut W,
    currency: &str,
    description: &str,
    amount: &str,
    category: &str,
) -> Result<()> {
    let expense = service
        .add_expense(description, amount, category)
        .context("Amount must be a number, e.g. '4.50' or '12'")?;
    service.save()?;
    writeln!(
        out,
        "Added expense: {} ({}, {})",
        expense.description,
        format_amount(currency, expense.amount_cents),
        expense.category
    )?;
    Ok(())
}

fn run_clear_command<R: BufRead, W: Write>(
    service: &mut ExpenseService,
    input: R,
    out: &mut W,
    yes: bool,
) -> Result<()> {
    let confirmed = yes
        || confirm(
            "Are you sure you want to clear all expenses?",
            input,
            &mut *out,
        )?;
    if confirmed {
        let removed = service.clear_expenses();
        service.save()?;
        writeln!(out, "Cleared {} expense(s).", removed)?;
    } else {
        writeln!(out, "Nothing cleared.")?;
    }
    Ok(())
}

fn run_save_command<W: Write>(service: &ExpenseService, out: &mut W) -> Result<()> {
    service.save()?;
    writeln!(out, "Expenses saved. Thank you for using the Expense Tracker.")?;
    Ok(())
}

/// A validated export type and format pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportTarget {
    ExpensesCsv,
    ExpensesJson,
    SummaryCsv,
    SummaryJson,
    FullJson,
}

impl ExportTarget {
    fn parse(export_type: &str, format: Option<&str>) -> Result<Self> {
        match (export_type, format) {
            ("expenses", None | Some("csv")) => Ok(ExportTarget::ExpensesCsv),
            ("expenses", Some("json")) => Ok(ExportTarget::ExpensesJson),
            ("summary", None | Some("csv")) => Ok(ExportTarget::SummaryCsv),
            ("summary", Some("json")) => Ok(ExportTarget::SummaryJson),
            ("full", None | Some("json")) => Ok(ExportTarget::FullJson),
            ("expenses" | "summary" | "full", Some(other)) => anyhow::bail!(
                "Invalid format '{}' for {}. Valid formats: csv, json (full: json only)",
                other,
                export_type
            ),
            _ => anyhow::bail!(
                "Invalid export type '{}'. Valid types: expenses, summary, full",
                export_type
            ),
        }
    }
}

fn run_export_command(
    service: &ExpenseService,
    export_type: &str,
    output: Option<PathBuf>,
    format: Option<&str>,
) -> Result<()> {
    use std::fs::File;

    // Checked before the output file is created so a typo never truncates it
    let target = ExportTarget::parse(export_type, format)?;
    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(io::BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };

    let count = match target {
        ExportTarget::ExpensesCsv => exporter.export_expenses_csv(writer)?,
        ExportTarget::ExpensesJson => exporter.export_expenses_json(writer)?,
        ExportTarget::SummaryCsv => exporter.export_summary_csv(writer)?,
        ExportTarget::SummaryJson => exporter.export_summary_json(writer)?.categories.len(),
        ExportTarget::FullJson => exporter.export_full_json(writer)?.expenses.len(),
    };

    if let Some(path) = output {
        eprintln!("Exported {} {} to {}", count, export_type, path.display());
    }

    Ok(())
}

fn run_import_command<W: Write>(
    service: &mut ExpenseService,
    out: &mut W,
    input: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::Read;

    let reader: Box<dyn Read> = match &input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(io::stdin()),
    };

    let result = Importer::new(service).import_expenses_csv(reader, ImportOptions { dry_run })?;

    if dry_run {
        writeln!(out, "Validation successful")?;
    } else {
        if result.imported > 0 {
            service.save()?;
        }
        writeln!(out, "Import complete")?;
    }
    writeln!(out, "  Imported: {}", result.imported)?;
    writeln!(out, "  Errors:   {}", result.errors.len())?;

    if !result.errors.is_empty() {
        writeln!(out, "\nErrors:")?;
        for error in result.errors.iter().take(10) {
            writeln!(out, "  Line {}: {}", error.line, error.error)?;
        }
        if result.errors.len() > 10 {
            writeln!(out, "  ... and {} more errors", result.errors.len() - 10)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::Expense;
    use crate::storage::LedgerSnapshot;

    fn sample_service() -> ExpenseService {
        let mut service = ExpenseService::new("unused.dat");
        service.record_expense("Coffee", 450, "Food");
        service.record_expense("Bus", 200, "Transport");
        service.record_expense("Lunch", 1200, "Food");
        service
    }

    #[test]
    fn test_parse_add_command() {
        let cli = Cli::try_parse_from(["expense-tracker", "add", "Coffee", "4.50", "Food"]).unwrap();

        assert_eq!(cli.file, PathBuf::from(DEFAULT_FILE_NAME));
        match cli.command {
            Commands::Add {
                description,
                amount,
                category,
            } => {
                assert_eq!(description, "Coffee");
                assert_eq!(amount, "4.50");
                assert_eq!(category, "Food");
            }
            other => panic!("expected add, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_accepts_negative_amount() {
        let cli = Cli::try_parse_from([
            "expense-tracker",
            "--file",
            "other.dat",
            "add",
            "Refund",
            "-20.00",
            "Clothes",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("other.dat"));
        assert!(matches!(cli.command, Commands::Add { ref amount, .. } if amount == "-20.00"));
    }

    #[test]
    fn test_parse_clear_flags() {
        let cli = Cli::try_parse_from(["expense-tracker", "clear", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear { yes: true }));

        let cli = Cli::try_parse_from(["expense-tracker", "-v", "clear"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Clear { yes: false }));
    }

    #[test]
    fn test_confirm() {
        let mut prompt = Vec::new();
        assert!(confirm("Clear?", "y\n".as_bytes(), &mut prompt).unwrap());
        assert_eq!(String::from_utf8(prompt).unwrap(), "Clear? [y/N] ");

        assert!(confirm("Clear?", "YES\n".as_bytes(), io::sink()).unwrap());
        assert!(!confirm("Clear?", "n\n".as_bytes(), io::sink()).unwrap());
        assert!(!confirm("Clear?", "\n".as_bytes(), io::sink()).unwrap());
        assert!(!confirm("Clear?", "".as_bytes(), io::sink()).unwrap());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("₹", 450), "₹4.50");
        assert_eq!(format_amount("$", -2000), "-$20.00");
        assert_eq!(format_amount("", 0), "0.00");
    }

    #[test]
    fn test_render_empty_list_and_summary() {
        let service = ExpenseService::new("unused.dat");
        let mut out = Vec::new();

        render_expenses(&mut out, &service, "₹", "table").unwrap();
        render_summary(&mut out, &service, "₹", "table").unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No expenses recorded yet.\nNo expenses recorded yet.\n"
        );
    }

    #[test]
    fn test_render_expenses_table() {
        let service = sample_service();
        let mut out = Vec::new();

        render_expenses(&mut out, &service, "₹", "table").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("Coffee"));
        assert!(lines[2].contains("₹4.50"));
        assert!(lines[3].starts_with("Bus"));
        assert!(lines[4].starts_with("Lunch"));
    }

    #[test]
    fn test_render_summary_table() {
        let service = sample_service();
        let mut out = Vec::new();

        render_summary(&mut out, &service, "₹", "table").unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("₹16.50"));
        assert!(text.contains("₹2.00"));
        assert!(text.contains("₹18.50"));
        let food = text.lines().position(|l| l.starts_with("Food")).unwrap();
        let transport = text.lines().position(|l| l.starts_with("Transport")).unwrap();
        assert!(food < transport);
    }

    #[test]
    fn test_render_rejects_unknown_format() {
        let service = sample_service();
        let err = render_expenses(&mut io::sink(), &service, "₹", "xml").unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Coffee", 10), "Coffee");
        assert_eq!(truncate("A very long description", 10), "A very ...");
        assert_eq!(truncate("चाय और समोसा", 5), "चा...");
    }

    fn temp_service() -> (ExpenseService, TempDir) {
        let dir = TempDir::new().unwrap();
        let service = ExpenseService::new(dir.path().join("expenses.dat"));
        (service, dir)
    }

    fn saved(service: &ExpenseService) -> Vec<Expense> {
        ExpenseService::open(service.path()).0.list_expenses().to_vec()
    }

    #[test]
    fn test_load_notice() {
        let notice = Some("No expenses found. Starting with an empty list.");
        assert_eq!(load_notice(&LoadStatus::NotFound), notice);
        assert_eq!(load_notice(&LoadStatus::Unreadable("bad".into())), notice);
        assert_eq!(load_notice(&LoadStatus::Loaded(0)), None);
    }

    #[test]
    fn test_add_command_saves_immediately() {
        let (mut service, _dir) = temp_service();
        let mut out = Vec::new();

        run_add_command(&mut service, &mut out, "₹", "Coffee", "4.50", "Food").unwrap();

        assert_eq!(saved(&service), vec![Expense::new("Coffee", 450, "Food")]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Added expense: Coffee (₹4.50, Food)\n"
        );
    }

    #[test]
    fn test_add_command_rejects_bad_amount_without_saving() {
        let (mut service, _dir) = temp_service();

        let err = run_add_command(&mut service, &mut io::sink(), "₹", "Coffee", "lots", "Food")
            .unwrap_err();

        assert!(err.to_string().contains("Amount must be a number"));
        assert!(service.list_expenses().is_empty());
        assert!(!service.path().exists());
    }

    #[test]
    fn test_clear_command_with_yes_persists() {
        let (mut service, _dir) = temp_service();
        service.record_expense("Coffee", 450, "Food");
        service.save().unwrap();

        let mut out = Vec::new();
        run_clear_command(&mut service, io::empty(), &mut out, true).unwrap();

        assert!(service.list_expenses().is_empty());
        assert!(saved(&service).is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "Cleared 1 expense(s).\n");
    }

    #[test]
    fn test_clear_command_declined_keeps_file() {
        let (mut service, _dir) = temp_service();
        service.record_expense("Coffee", 450, "Food");
        service.save().unwrap();

        let mut out = Vec::new();
        run_clear_command(&mut service, "n\n".as_bytes(), &mut out, false).unwrap();

        assert_eq!(service.list_expenses().len(), 1);
        assert_eq!(saved(&service).len(), 1);
        assert!(String::from_utf8(out).unwrap().ends_with("Nothing cleared.\n"));
    }

    #[test]
    fn test_clear_command_confirmed_interactively() {
        let (mut service, _dir) = temp_service();
        service.record_expense("Coffee", 450, "Food");
        service.save().unwrap();

        run_clear_command(&mut service, "yes\n".as_bytes(), &mut io::sink(), false).unwrap();

        assert!(saved(&service).is_empty());
    }

    #[test]
    fn test_save_command_creates_file() {
        let (service, _dir) = temp_service();
        let mut out = Vec::new();

        run_save_command(&service, &mut out).unwrap();

        assert_eq!(
            ExpenseService::open(service.path()).1,
            LoadStatus::Loaded(0)
        );
        assert!(String::from_utf8(out).unwrap().starts_with("Expenses saved."));
    }

    #[test]
    fn test_import_command_skips_bad_rows_and_saves() {
        let (mut service, dir) = temp_service();
        let input = dir.path().join("in.csv");
        std::fs::write(
            &input,
            "description,amount,category\nCoffee,4.50,Food\nMystery,lots,Food\nBus,2,Transport\n",
        )
        .unwrap();

        let mut out = Vec::new();
        run_import_command(&mut service, &mut out, Some(input), false).unwrap();

        assert_eq!(
            saved(&service),
            vec![
                Expense::new("Coffee", 450, "Food"),
                Expense::new("Bus", 200, "Transport"),
            ]
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Imported: 2"));
        assert!(text.contains("Line 3: Invalid amount"));
    }

    #[test]
    fn test_import_command_with_nothing_valid_does_not_save() {
        let (mut service, dir) = temp_service();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "description,amount,category\nMystery,lots,Food\n").unwrap();

        run_import_command(&mut service, &mut io::sink(), Some(input), false).unwrap();

        assert!(!service.path().exists());
    }

    #[test]
    fn test_import_command_dry_run_does_not_save() {
        let (mut service, dir) = temp_service();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "description,amount,category\nCoffee,4.50,Food\n").unwrap();

        let mut out = Vec::new();
        run_import_command(&mut service, &mut out, Some(input), true).unwrap();

        assert!(service.list_expenses().is_empty());
        assert!(!service.path().exists());
        assert!(String::from_utf8(out).unwrap().starts_with("Validation successful"));
    }

    #[test]
    fn test_export_command_writes_file() {
        let (mut service, dir) = temp_service();
        service.record_expense("Coffee", 450, "Food");
        service.record_expense("Lunch", 1200, "Food");
        let output = dir.path().join("out.csv");

        run_export_command(&service, "expenses", Some(output.clone()), None).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "description,amount,category\nCoffee,4.50,Food\nLunch,12.00,Food\n"
        );

        let json = dir.path().join("full.json");
        run_export_command(&service, "full", Some(json.clone()), Some("json")).unwrap();
        let snapshot: LedgerSnapshot =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(snapshot.expenses, service.list_expenses());
    }

    #[test]
    fn test_export_command_rejects_bad_target_before_touching_output() {
        let (service, dir) = temp_service();
        let output = dir.path().join("existing.csv");
        std::fs::write(&output, "keep me").unwrap();

        let err = run_export_command(&service, "bogus", Some(output.clone()), None).unwrap_err();
        assert!(err.to_string().contains("Invalid export type"));

        let err =
            run_export_command(&service, "full", Some(output.clone()), Some("csv")).unwrap_err();
        assert!(err.to_string().contains("Invalid format"));

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");
    }

    #[test]
    fn test_export_target_parse() {
        assert_eq!(
            ExportTarget::parse("expenses", None).unwrap(),
            ExportTarget::ExpensesCsv
        );
        assert_eq!(
            ExportTarget::parse("summary", Some("json")).unwrap(),
            ExportTarget::SummaryJson
        );
        assert_eq!(
            ExportTarget::parse("full", None).unwrap(),
            ExportTarget::FullJson
        );
        assert!(ExportTarget::parse("summary", Some("xml")).is_err());
    }
}
