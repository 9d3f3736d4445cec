use thiserror::Error;

use crate::domain::ValidationError;
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not save expenses: {0}")]
    Storage(#[from] StoreError),

    #[error("No expenses to export")]
    NothingToExport,

    #[error("Export failed: {0}")]
    Export(#[from] anyhow::Error),
}
