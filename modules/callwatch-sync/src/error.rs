use thiserror::Error;

use callwatch_core::{CallSource, StoreError};

/// Errors surfaced by a provider feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<elevenlabs_client::ElevenLabsError> for FeedError {
    fn from(err: elevenlabs_client::ElevenLabsError) -> Self {
        match err {
            elevenlabs_client::ElevenLabsError::Api { status, message } => {
                FeedError::Api { status, message }
            }
            other => FeedError::Transport(other.to_string()),
        }
    }
}

impl From<voximplant_client::VoximplantError> for FeedError {
    fn from(err: voximplant_client::VoximplantError) -> Self {
        match err {
            voximplant_client::VoximplantError::Api { status, message } => {
                FeedError::Api { status, message }
            }
            other => FeedError::Transport(other.to_string()),
        }
    }
}

/// A failed sync run, naming the stage that failed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch from {provider} failed: {err}")]
    Fetch { provider: CallSource, err: FeedError },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} is not a syncable source")]
    NotSyncable(CallSource),
}
