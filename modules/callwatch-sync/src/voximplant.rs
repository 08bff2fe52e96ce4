//! Telephony call history feed.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use callwatch_core::{CallRecord, CallSource};
use voximplant_client::VoximplantClient;

use crate::error::FeedError;
use crate::feed::{CallFeed, CallPage};
use crate::normalize;

/// Trailing window for the periodic sync pass.
const SYNC_LOOKBACK_DAYS: i64 = 7;

/// Default window for the read path when no bound is given.
const READ_LOOKBACK_DAYS: i64 = 30;

/// Sessions requested per sync pass.
const SYNC_COUNT: u32 = 100;

/// Sessions requested for the live unified view.
const READ_COUNT: u32 = 1000;

/// Date-window feed over the platform's call history. There is no
/// continuation token: each fetch covers one trailing window. Transport and
/// API failures are absorbed into empty results so one provider outage never
/// stalls the rest of the pipeline.
pub struct VoximplantFeed {
    client: Option<VoximplantClient>,
}

impl VoximplantFeed {
    pub fn new(account_id: Option<String>, api_key: Option<String>) -> Self {
        let client = match (account_id, api_key) {
            (Some(account_id), Some(api_key)) => Some(VoximplantClient::new(account_id, api_key)),
            _ => {
                warn!("Voximplant credentials not set, call history feed disabled");
                None
            }
        };
        Self { client }
    }

    async fn fetch_window(&self, from: DateTime<Utc>, to: DateTime<Utc>, count: u32) -> CallPage {
        let Some(client) = &self.client else {
            return CallPage::default();
        };

        let items = match client.get_call_history(from, to, count).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Call history fetch failed, treating as empty");
                return CallPage::default();
            }
        };

        let mut records = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for item in &items {
            match normalize::history_record(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed call history item");
                    skipped += 1;
                }
            }
        }

        CallPage {
            records,
            skipped,
            next_cursor: None,
        }
    }
}

#[async_trait]
impl CallFeed for VoximplantFeed {
    fn source(&self) -> CallSource {
        CallSource::Voximplant
    }

    /// One trailing-window page per run. The cursor is ignored and
    /// `next_cursor` stays `None`, so callers stop after this page.
    async fn fetch_page(&self, _cursor: Option<&str>) -> Result<CallPage, FeedError> {
        let to = Utc::now();
        let from = to - Duration::days(SYNC_LOOKBACK_DAYS);
        Ok(self.fetch_window(from, to, SYNC_COUNT).await)
    }

    async fn fetch_all(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<CallRecord>, FeedError> {
        let to = Utc::now();
        let from = since.unwrap_or_else(|| to - Duration::days(READ_LOOKBACK_DAYS));
        Ok(self.fetch_window(from, to, READ_COUNT).await.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_feed_reports_empty_pages() {
        let feed = VoximplantFeed::new(None, None);
        let page = feed.fetch_page(None).await.unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.skipped, 0);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn partial_credentials_leave_feed_disabled() {
        let feed = VoximplantFeed::new(Some("account-1".to_string()), None);
        let records = feed.fetch_all(None).await.unwrap();
        assert!(records.is_empty());
    }
}
