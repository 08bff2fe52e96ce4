//! Sync orchestration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use callwatch_core::{reconcile, CallRecord, CallSource, CallStore};

use crate::error::SyncError;
use crate::feed::{CallFeed, MAX_SYNC_PAGES};

/// Stats from one provider sync run.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub pages: u32,
    pub records_seen: u32,
    pub created: u32,
    pub duplicates: u32,
    /// Payload items the feed dropped during normalization.
    pub malformed: u32,
    /// Per-record failures (store errors, failed detail fetches).
    pub record_errors: u32,
    /// True when the trigger was dropped because a run was already in flight.
    pub skipped_overlap: bool,
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.skipped_overlap {
            return write!(f, "skipped (run already in progress)");
        }
        write!(
            f,
            "pages: {}, seen: {}, created: {}, duplicates: {}, malformed: {}, errors: {}",
            self.pages,
            self.records_seen,
            self.created,
            self.duplicates,
            self.malformed,
            self.record_errors
        )
    }
}

/// A provider feed plus its run flag. The `compare_exchange` on the flag is
/// the mutual exclusion: a trigger that loses the exchange is dropped, never
/// queued.
struct FeedSlot {
    feed: Arc<dyn CallFeed>,
    running: AtomicBool,
}

/// Clears the running flag on drop, so the slot is released on every exit
/// path, panics included.
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Pulls call records from both providers into the store and serves the
/// live merged view.
pub struct SyncService<S: CallStore> {
    store: S,
    elevenlabs: FeedSlot,
    voximplant: FeedSlot,
    match_window_secs: i64,
}

impl<S: CallStore> SyncService<S> {
    pub fn new(
        store: S,
        elevenlabs: Arc<dyn CallFeed>,
        voximplant: Arc<dyn CallFeed>,
        match_window_secs: i64,
    ) -> Self {
        Self {
            store,
            elevenlabs: FeedSlot {
                feed: elevenlabs,
                running: AtomicBool::new(false),
            },
            voximplant: FeedSlot {
                feed: voximplant,
                running: AtomicBool::new(false),
            },
            match_window_secs,
        }
    }

    /// On-demand sync of the conversation platform.
    pub async fn sync_elevenlabs(&self) -> Result<SyncReport, SyncError> {
        self.sync_slot(&self.elevenlabs).await
    }

    /// On-demand sync of the telephony platform.
    pub async fn sync_voximplant(&self) -> Result<SyncReport, SyncError> {
        self.sync_slot(&self.voximplant).await
    }

    /// On-demand sync for one provider. `Merged` is not a syncable source.
    pub async fn sync(&self, source: CallSource) -> Result<SyncReport, SyncError> {
        match source {
            CallSource::ElevenLabs => self.sync_elevenlabs().await,
            CallSource::Voximplant => self.sync_voximplant().await,
            CallSource::Merged => Err(SyncError::NotSyncable(source)),
        }
    }

    /// Run both providers concurrently. Never propagates: a failed run is
    /// logged, and the next scheduled pass retries from scratch.
    pub async fn sync_all(&self) {
        let (conversations, history) =
            tokio::join!(self.sync_elevenlabs(), self.sync_voximplant());
        if let Err(e) = conversations {
            error!(error = %e, "Conversation sync failed");
        }
        if let Err(e) = history {
            error!(error = %e, "Call history sync failed");
        }
    }

    async fn sync_slot(&self, slot: &FeedSlot) -> Result<SyncReport, SyncError> {
        let source = slot.feed.source();

        // Drop the trigger if a run is already in flight; never queue.
        if slot
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!(source = %source, "Sync already in progress, skipping");
            return Ok(SyncReport {
                skipped_overlap: true,
                ..Default::default()
            });
        }
        let _guard = RunGuard {
            running: &slot.running,
        };

        let run_id = Uuid::new_v4();
        info!(source = %source, run_id = %run_id, "Sync starting");

        let report = self.ingest(slot, source).await?;
        info!(source = %source, run_id = %run_id, "Sync complete. {report}");
        Ok(report)
    }

    /// Drain pages and ingest records strictly in page order. A page-fetch
    /// failure aborts the remaining pages of this run; records already
    /// stored stay, and the next run catches up.
    async fn ingest(&self, slot: &FeedSlot, source: CallSource) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_SYNC_PAGES {
            let page = slot
                .feed
                .fetch_page(cursor.as_deref())
                .await
                .map_err(|err| SyncError::Fetch {
                    provider: source,
                    err,
                })?;

            report.pages += 1;
            report.malformed += page.skipped;
            let page_len = page.records.len();

            for record in page.records {
                report.records_seen += 1;
                self.ingest_record(slot, record, &mut report).await;
            }

            cursor = page.next_cursor;
            if page_len == 0 || cursor.is_none() {
                break;
            }
        }

        if cursor.is_some() {
            warn!(source = %source, pages = report.pages, "Page ceiling reached, stopping this run");
        }

        Ok(report)
    }

    /// Process one record: skip if seen, enrich, create. Failures here are
    /// per-record: logged, counted, never fatal to the run.
    async fn ingest_record(&self, slot: &FeedSlot, mut record: CallRecord, report: &mut SyncReport) {
        let source = record.source;
        let external_id = record.external_id.clone();

        match self.store.exists(source, &external_id).await {
            Ok(true) => {
                report.duplicates += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(source = %source, external_id = %external_id, error = %e, "Exists check failed, skipping record");
                report.record_errors += 1;
                return;
            }
        }

        // Enrichment is best-effort: a failed detail fetch degrades to the
        // list-level record.
        match slot.feed.fetch_details(&external_id).await {
            Ok(Some(detail)) => {
                if !detail.transcription.is_empty() {
                    record.transcription = Some(detail.transcription);
                }
                record.summary = detail.summary.or(record.summary);
                record.audio_url = detail.audio_url.or(record.audio_url);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(source = %source, external_id = %external_id, error = %e, "Detail fetch failed, saving without detail");
                report.record_errors += 1;
            }
        }

        match self.store.create(record).await {
            Ok(_) => report.created += 1,
            Err(e) if e.is_duplicate() => {
                // Lost the race to a concurrent writer; routine.
                report.duplicates += 1;
            }
            Err(e) => {
                warn!(source = %source, external_id = %external_id, error = %e, "Failed to store record");
                report.record_errors += 1;
            }
        }
    }

    /// Live merged view across both providers, newest first. Telephony
    /// records anchor the merge and conversation records enrich them. A
    /// conversation-side failure propagates; the telephony feed absorbs its
    /// own failures by contract.
    pub async fn unified_view(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<CallRecord>, SyncError> {
        let (conversations, history) = tokio::join!(
            self.elevenlabs.feed.fetch_all(since),
            self.voximplant.feed.fetch_all(since),
        );

        let candidates = conversations.map_err(|err| SyncError::Fetch {
            provider: CallSource::ElevenLabs,
            err,
        })?;
        let anchors = history.map_err(|err| SyncError::Fetch {
            provider: CallSource::Voximplant,
            err,
        })?;

        info!(
            history = anchors.len(),
            conversations = candidates.len(),
            "Reconciling unified view"
        );
        Ok(reconcile(anchors, candidates, self.match_window_secs))
    }
}
