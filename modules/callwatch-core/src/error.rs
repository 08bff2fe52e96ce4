use thiserror::Error;

use crate::types::CallSource;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this (source, external_id) is already stored. Routine
    /// during re-ingestion, not a failure.
    #[error("duplicate call record: {provider} {external_id}")]
    Duplicate {
        provider: CallSource,
        external_id: String,
    },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}
