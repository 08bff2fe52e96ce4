//! Provider feed seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use callwatch_core::{CallRecord, CallSource};

use crate::error::FeedError;

/// Hard ceiling on pages drained in one run, in case a provider keeps
/// handing out cursors.
pub const MAX_SYNC_PAGES: u32 = 50;

/// One page of normalized records from a provider.
#[derive(Debug, Default)]
pub struct CallPage {
    pub records: Vec<CallRecord>,
    /// Payload items dropped during normalization.
    pub skipped: u32,
    /// Opaque continuation token; `None` means the listing is done.
    pub next_cursor: Option<String>,
}

/// Enrichment payload for providers that keep transcript content behind a
/// second endpoint.
#[derive(Debug, Clone)]
pub struct CallDetail {
    pub transcription: String,
    pub summary: Option<String>,
    pub audio_url: Option<String>,
}

/// A provider of call records in canonical form.
///
/// Implementations normalize inside `fetch_page`: malformed payload items
/// are logged and counted in `skipped`, never returned as errors. Whether a
/// transport failure propagates or degrades to an empty page is the
/// adapter's call.
#[async_trait]
pub trait CallFeed: Send + Sync {
    fn source(&self) -> CallSource;

    /// Fetch one page, newest records first. Pass the previous page's cursor
    /// to continue, `None` to start over.
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<CallPage, FeedError>;

    /// Fetch enrichment detail for one record. Default: no detail capability.
    async fn fetch_details(&self, _external_id: &str) -> Result<Option<CallDetail>, FeedError> {
        Ok(None)
    }

    /// Drain the feed for the read path. The default drains `fetch_page`
    /// under the page ceiling and filters client-side by `since`; providers
    /// with a native date window override this.
    async fn fetch_all(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<CallRecord>, FeedError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_SYNC_PAGES {
            let page = self.fetch_page(cursor.as_deref()).await?;
            let empty = page.records.is_empty();
            records.extend(page.records);
            cursor = page.next_cursor;
            if empty || cursor.is_none() {
                break;
            }
        }

        if let Some(since) = since {
            records.retain(|r| r.timestamp >= since);
        }
        Ok(records)
    }
}
