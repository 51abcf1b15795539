use thiserror::Error;

use crate::domain::AmountError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Failed to save expenses: {0}")]
    IoFailure(#[from] StorageError),
}
