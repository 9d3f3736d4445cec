use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{CategorySet, ExpenseRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode expenses: {0}")]
    Encode(#[from] serde_json::Error),
}

/// All recorded expenses, in insertion order, plus the known categories.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<ExpenseRecord>,
    categories: CategorySet,
}

impl Ledger {
    /// Build a ledger from persisted records. The seed categories come first,
    /// followed by any other category found in the records.
    pub fn from_records(records: Vec<ExpenseRecord>) -> Self {
        let mut categories = CategorySet::default();
        for record in &records {
            categories.register(&record.category);
        }
        Self {
            records,
            categories,
        }
    }

    /// Add a record at the end and register its category.
    pub fn push(&mut self, record: ExpenseRecord) {
        self.categories.register(&record.category);
        self.records.push(record);
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategorySet {
        &mut self.categories
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What happened when the data file was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No data file yet
    Fresh,
    /// File parsed; holds the number of records
    Loaded(usize),
    /// File exists but could not be read or parsed; holds the reason
    Corrupt(String),
}

/// JSON file persistence for the ledger. The whole record list is read and
/// written at once.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the data file. Never fails: a missing file gives an empty ledger,
    /// and an unreadable or unparsable one is reported and also gives an
    /// empty ledger.
    pub async fn load(&self) -> (Ledger, LoadOutcome) {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no data file, starting fresh");
                return (Ledger::default(), LoadOutcome::Fresh);
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read data file");
                return (Ledger::default(), LoadOutcome::Corrupt(e.to_string()));
            }
        };

        match serde_json::from_slice::<Vec<ExpenseRecord>>(&bytes) {
            Ok(records) => {
                let count = records.len();
                tracing::debug!(path = %self.path.display(), count, "loaded expenses");
                (Ledger::from_records(records), LoadOutcome::Loaded(count))
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not parse data file");
                (Ledger::default(), LoadOutcome::Corrupt(e.to_string()))
            }
        }
    }

    /// Overwrite the data file with every record in the ledger.
    ///
    /// The content goes to a sibling temporary file first and is then renamed
    /// over the data file, so a failed save leaves the previous file intact.
    pub async fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(ledger.records())?;
        let tmp_path = self.tmp_path();

        if let Err(source) = tokio::fs::write(&tmp_path, &json).await {
            return Err(StoreError::Io {
                path: tmp_path,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        tracing::debug!(path = %self.path.display(), count = ledger.len(), "saved expenses");
        Ok(())
    }

    /// Add a record to the ledger and persist it. The record stays in memory
    /// even when the save fails.
    pub async fn append(
        &self,
        ledger: &mut Ledger,
        record: ExpenseRecord,
    ) -> Result<(), StoreError> {
        ledger.push(record);
        self.save(ledger).await
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
