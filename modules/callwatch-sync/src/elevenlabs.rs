//! Conversation platform feed.

use async_trait::async_trait;
use tracing::warn;

use callwatch_core::CallSource;
use elevenlabs_client::ElevenLabsClient;

use crate::error::FeedError;
use crate::feed::{CallDetail, CallFeed, CallPage};
use crate::normalize;

/// Page size requested from the conversation list.
const PAGE_SIZE: u32 = 100;

/// Cursor-paginated conversation feed with detail enrichment behind a second
/// endpoint. Without an API key the feed is disabled and reports empty
/// pages; transport failures propagate and abort the caller's page loop.
pub struct ElevenLabsFeed {
    client: Option<ElevenLabsClient>,
}

impl ElevenLabsFeed {
    pub fn new(api_key: Option<String>) -> Self {
        let client = match api_key {
            Some(key) => Some(ElevenLabsClient::new(key)),
            None => {
                warn!("ELEVEN_LABS_API_KEY not set, conversation feed disabled");
                None
            }
        };
        Self { client }
    }
}

#[async_trait]
impl CallFeed for ElevenLabsFeed {
    fn source(&self) -> CallSource {
        CallSource::ElevenLabs
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<CallPage, FeedError> {
        let Some(client) = &self.client else {
            return Ok(CallPage::default());
        };

        let page = client.list_conversations(PAGE_SIZE, cursor).await?;

        let mut records = Vec::with_capacity(page.conversations.len());
        let mut skipped = 0;
        for conv in &page.conversations {
            match normalize::conversation_record(conv) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed conversation");
                    skipped += 1;
                }
            }
        }

        Ok(CallPage {
            records,
            skipped,
            next_cursor: next_cursor(page.has_more, page.next_cursor),
        })
    }

    async fn fetch_details(&self, external_id: &str) -> Result<Option<CallDetail>, FeedError> {
        let Some(client) = &self.client else {
            return Ok(None);
        };

        let detail = client.get_conversation(external_id).await?;
        let transcription = detail
            .transcript
            .as_deref()
            .map(normalize::join_transcript)
            .unwrap_or_default();
        let summary = detail.summary().map(str::to_string);

        Ok(Some(CallDetail {
            transcription,
            summary,
            audio_url: detail.audio_url,
        }))
    }
}

/// Continue only while the API says there is more AND hands back a usable
/// cursor. `has_more` with a missing or empty cursor would replay the same
/// page forever, so it terminates instead.
fn next_cursor(has_more: bool, cursor: Option<String>) -> Option<String> {
    if !has_more {
        return None;
    }
    cursor.filter(|c| !c.is_empty())
}
