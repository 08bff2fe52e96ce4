use serde::Deserialize;

/// Envelope for `GetCallHistory`. Voximplant reports failures as HTTP 200
/// with an `error` object in the body, so both arms live here.
#[derive(Debug, Clone, Deserialize)]
pub struct CallHistoryResponse {
    pub result: Option<Vec<CallHistoryItem>>,
    pub total_count: Option<i64>,
    pub count: Option<i64>,
    pub error: Option<ApiErrorBody>,
}

/// In-body error object.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub msg: Option<String>,
    pub code: Option<i64>,
}

/// One call session from the history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CallHistoryItem {
    pub call_session_history_id: Option<i64>,
    pub remote_number: Option<String>,
    pub duration: Option<i64>,
    pub successful: Option<bool>,
    pub record_url: Option<String>,
    pub cost: Option<f64>,
    /// `YYYY-MM-DD HH:MM:SS` in UTC.
    pub start_date: Option<String>,
}
