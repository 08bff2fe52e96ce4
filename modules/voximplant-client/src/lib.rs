pub mod error;
pub mod types;

pub use error::{Result, VoximplantError};
pub use types::{ApiErrorBody, CallHistoryItem, CallHistoryResponse};

use chrono::{DateTime, Utc};

const BASE_URL: &str = "https://api.voximplant.com/platform_api";

/// Date format the platform API expects, interpreted as UTC.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct VoximplantClient {
    client: reqwest::Client,
    account_id: String,
    api_key: String,
}

impl VoximplantClient {
    pub fn new(account_id: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_id,
            api_key,
        }
    }

    /// Fetch call history for a date window, newest sessions included up to
    /// `count`. `with_records` is always requested so record URLs come back
    /// when available.
    pub async fn get_call_history(
        &self,
        from_date: DateTime<Utc>,
        to_date: DateTime<Utc>,
        count: u32,
    ) -> Result<Vec<CallHistoryItem>> {
        let url = format!("{}/GetCallHistory", BASE_URL);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("account_id", self.account_id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("from_date", &from_date.format(DATE_FORMAT).to_string()),
                ("to_date", &to_date.format(DATE_FORMAT).to_string()),
                ("count", &count.to_string()),
                ("with_records", "true"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VoximplantError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: CallHistoryResponse = resp.json().await?;
        if let Some(api_err) = envelope.error {
            return Err(VoximplantError::Api {
                status: status.as_u16(),
                message: api_err.msg.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let items = envelope.result.unwrap_or_default();
        tracing::debug!(count = items.len(), "Fetched call history");
        Ok(items)
    }
}
