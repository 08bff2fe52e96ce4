use thiserror::Error;

pub type Result<T> = std::result::Result<T, VoximplantError>;

#[derive(Debug, Error)]
pub enum VoximplantError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for VoximplantError {
    fn from(err: reqwest::Error) -> Self {
        VoximplantError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for VoximplantError {
    fn from(err: serde_json::Error) -> Self {
        VoximplantError::Parse(err.to_string())
    }
}
