pub mod error;
pub mod types;

pub use error::{ElevenLabsError, Result};
pub use types::{
    ConversationAnalysis, ConversationDetail, ConversationPage, ConversationSummary,
    TranscriptTurn,
};

const BASE_URL: &str = "https://api.elevenlabs.io/v1";

pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Fetch one page of the conversation list. Pass the cursor from the
    /// previous page's `next_cursor` to continue, or `None` for the first page.
    pub async fn list_conversations(
        &self,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<ConversationPage> {
        let url = format!("{}/convai/conversations", BASE_URL);
        let mut req = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .query(&[("page_size", page_size.to_string())]);
        if let Some(cursor) = cursor {
            req = req.query(&[("cursor", cursor)]);
        }

        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ElevenLabsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let page: ConversationPage = resp.json().await?;
        tracing::debug!(
            count = page.conversations.len(),
            has_more = page.has_more,
            "Fetched conversation page"
        );
        Ok(page)
    }

    /// Fetch one conversation's full detail, including transcript turns and
    /// post-call analysis.
    pub async fn get_conversation(&self, conversation_id: &str) -> Result<ConversationDetail> {
        let url = format!("{}/convai/conversations/{}", BASE_URL, conversation_id);
        let resp = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ElevenLabsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let detail: ConversationDetail = resp.json().await?;
        tracing::debug!(conversation_id, "Fetched conversation detail");
        Ok(detail)
    }
}
