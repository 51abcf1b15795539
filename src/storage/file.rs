use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Expense;

use super::FORMAT_VERSION;

/// On-disk layout of the save file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub expenses: Vec<Expense>,
}

impl LedgerSnapshot {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            expenses,
        }
    }
}

/// Outcome of reading a save file. Only `Loaded` carries records; the other
/// two mean the caller starts from an empty ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restored {
    Loaded(Vec<Expense>),
    NotFound,
    Unreadable(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode expenses: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Write every record to `path`, replacing whatever was there.
pub fn save(path: &Path, expenses: &[Expense]) -> Result<(), StorageError> {
    let io_error = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let snapshot = LedgerSnapshot::new(expenses.to_vec());
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &snapshot).map_err(|e| {
        if e.is_io() {
            io_error(io::Error::from(e))
        } else {
            StorageError::Encode(e)
        }
    })?;
    // Dropping a BufWriter swallows write errors, so flush explicitly
    writer.flush().map_err(io_error)?;

    tracing::debug!(path = %path.display(), count = expenses.len(), "saved expenses");
    Ok(())
}

/// Read a save file. Never fails: a missing, unreadable or incompatible file
/// is reported through the returned variant and no records are produced.
pub fn restore(path: &Path) -> Restored {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Restored::NotFound,
        Err(e) => return Restored::Unreadable(e.to_string()),
    };

    let snapshot: LedgerSnapshot = match serde_json::from_reader(BufReader::new(file)) {
        Ok(snapshot) => snapshot,
        Err(e) => return Restored::Unreadable(e.to_string()),
    };

    if snapshot.version != FORMAT_VERSION {
        return Restored::Unreadable(format!(
            "unsupported format version {}",
            snapshot.version
        ));
    }

    tracing::debug!(
        path = %path.display(),
        count = snapshot.expenses.len(),
        saved_at = %snapshot.saved_at,
        "restored expenses"
    );
    Restored::Loaded(snapshot.expenses)
}
