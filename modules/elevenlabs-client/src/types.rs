use serde::Deserialize;

// --- Conversation list types ---

/// One page of the conversation list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationPage {
    #[serde(default)]
    pub conversations: Vec<ConversationSummary>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// A conversation as returned by the list endpoint. The list view carries
/// timing and outcome fields only; transcript and analysis require a detail
/// fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: Option<String>,
    pub agent_id: Option<String>,
    pub start_time_unix_secs: Option<i64>,
    pub duration_secs: Option<i64>,
    pub status: Option<String>,
    pub call_successful: Option<String>,
    pub transcript_summary: Option<String>,
}

// --- Conversation detail types ---

/// Full conversation detail: transcript turns, post-call analysis, audio.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationDetail {
    pub conversation_id: Option<String>,
    pub transcript: Option<Vec<TranscriptTurn>>,
    pub analysis: Option<ConversationAnalysis>,
    pub audio_url: Option<String>,
}

/// A single turn in the conversation transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptTurn {
    pub role: Option<String>,
    pub message: Option<String>,
}

/// Post-call analysis attached to a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationAnalysis {
    pub transcript_summary: Option<String>,
}

impl ConversationDetail {
    /// Returns the analysis summary when present.
    pub fn summary(&self) -> Option<&str> {
        self.analysis
            .as_ref()
            .and_then(|a| a.transcript_summary.as_deref())
    }
}
