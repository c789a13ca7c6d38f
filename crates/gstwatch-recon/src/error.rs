//! Error types for reconciliation operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Document store error: {0}")]
    Store(#[from] gstwatch_store::StoreError),

    #[error("Graph error: {0}")]
    Graph(#[from] anyhow::Error),
}

pub type ReconResult<T> = Result<T, ReconError>;
