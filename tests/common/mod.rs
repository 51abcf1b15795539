// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use expense_tracker::application::{ExpenseService, LoadStatus};
use tempfile::TempDir;

/// Helper to create a service backed by a save file in a temporary directory.
/// The file does not exist yet, so the service starts empty.
pub fn test_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let (service, status) = ExpenseService::open(save_path(&temp_dir));
    assert_eq!(status, LoadStatus::NotFound);
    Ok((service, temp_dir))
}

pub fn save_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("expenses.dat")
}

/// Test fixture: the coffee/bus/lunch day
pub struct SampleDay;

impl SampleDay {
    pub fn record(service: &mut ExpenseService) -> Result<()> {
        service.add_expense("Coffee", "4.50", "Food")?;
        service.add_expense("Bus", "2.00", "Transport")?;
        service.add_expense("Lunch", "12.00", "Food")?;
        Ok(())
    }
}
