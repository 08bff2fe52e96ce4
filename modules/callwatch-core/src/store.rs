//! CallStore contract and in-memory implementation.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{CallFilter, CallRecord, CallSource, CallStats};

/// Persists canonical call records with first-write-wins semantics.
///
/// There is deliberately no update operation: stored records are immutable,
/// and re-ingesting a seen (source, external_id) is a skip. Implementations
/// back this with whatever storage they like; the engine only depends on
/// this contract.
///
/// Also implemented for `Arc<S>` so tests can share the store for assertions.
#[async_trait]
pub trait CallStore: Send + Sync {
    /// True when a record with this (source, external_id) is already stored.
    async fn exists(&self, source: CallSource, external_id: &str) -> Result<bool, StoreError>;

    /// Insert a new record. An already stored (source, external_id) is
    /// rejected with `StoreError::Duplicate` and never written twice, even
    /// under concurrent callers.
    async fn create(&self, record: CallRecord) -> Result<CallRecord, StoreError>;

    /// Stored records matching the filter, newest first.
    async fn query(&self, filter: &CallFilter) -> Result<Vec<CallRecord>, StoreError>;

    /// Aggregate counts over all stored records.
    async fn stats(&self) -> Result<CallStats, StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryCallStore (default wiring and tests, no database required)
// ---------------------------------------------------------------------------

/// In-memory call store. The duplicate check and the insert in `create`
/// happen under one lock, so concurrent creates for the same id resolve to
/// exactly one stored row and one `Duplicate` rejection.
pub struct MemoryCallStore {
    records: Mutex<Vec<CallRecord>>,
}

impl MemoryCallStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Read all stored records in insertion order (for test assertions).
    pub fn records(&self) -> Vec<CallRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallStore for MemoryCallStore {
    async fn exists(&self, source: CallSource, external_id: &str) -> Result<bool, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .any(|r| r.source == source && r.external_id == external_id))
    }

    async fn create(&self, record: CallRecord) -> Result<CallRecord, StoreError> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.source == record.source && r.external_id == record.external_id)
        {
            return Err(StoreError::Duplicate {
                provider: record.source,
                external_id: record.external_id,
            });
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn query(&self, filter: &CallFilter) -> Result<Vec<CallRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<CallRecord> = records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matched)
    }

    async fn stats(&self) -> Result<CallStats, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(CallStats::from_records(&records))
    }
}

// ---------------------------------------------------------------------------
// Arc<S> blanket impl
// ---------------------------------------------------------------------------

#[async_trait]
impl<S: CallStore + ?Sized> CallStore for Arc<S> {
    async fn exists(&self, source: CallSource, external_id: &str) -> Result<bool, StoreError> {
        (**self).exists(source, external_id).await
    }

    async fn create(&self, record: CallRecord) -> Result<CallRecord, StoreError> {
        (**self).create(record).await
    }

    async fn query(&self, filter: &CallFilter) -> Result<Vec<CallRecord>, StoreError> {
        (**self).query(filter).await
    }

    async fn stats(&self) -> Result<CallStats, StoreError> {
        (**self).stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallStatus, Sentiment};
    use chrono::{TimeZone, Utc};

    fn make_record(source: CallSource, external_id: &str, hour: u32) -> CallRecord {
        CallRecord {
            external_id: external_id.to_string(),
            source,
            caller_number: Some("+15550001111".to_string()),
            duration_seconds: 42,
            status: CallStatus::Completed,
            sentiment: Some(Sentiment::Neutral),
            transcription: None,
            summary: None,
            audio_url: None,
            agent_id: None,
            cost: None,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
            matched_external_id: None,
        }
    }

    #[tokio::test]
    async fn create_then_exists() {
        let store = MemoryCallStore::new();
        store
            .create(make_record(CallSource::Voximplant, "123", 9))
            .await
            .unwrap();

        assert!(store.exists(CallSource::Voximplant, "123").await.unwrap());
        assert!(!store.exists(CallSource::ElevenLabs, "123").await.unwrap());
    }

    #[tokio::test]
    async fn second_create_with_same_id_is_rejected() {
        let store = MemoryCallStore::new();
        store
            .create(make_record(CallSource::Voximplant, "123", 9))
            .await
            .unwrap();

        let err = store
            .create(make_record(CallSource::Voximplant, "123", 10))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.records().len(), 1, "duplicate must not add a row");
    }

    #[tokio::test]
    async fn same_id_under_different_sources_both_stored() {
        let store = MemoryCallStore::new();
        store
            .create(make_record(CallSource::Voximplant, "123", 9))
            .await
            .unwrap();
        store
            .create(make_record(CallSource::ElevenLabs, "123", 9))
            .await
            .unwrap();

        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn query_returns_newest_first() {
        let store = MemoryCallStore::new();
        store
            .create(make_record(CallSource::Voximplant, "early", 8))
            .await
            .unwrap();
        store
            .create(make_record(CallSource::Voximplant, "late", 15))
            .await
            .unwrap();

        let results = store.query(&CallFilter::default()).await.unwrap();
        assert_eq!(results[0].external_id, "late");
        assert_eq!(results[1].external_id, "early");
    }

    #[tokio::test]
    async fn query_applies_source_filter() {
        let store = MemoryCallStore::new();
        store
            .create(make_record(CallSource::Voximplant, "v1", 9))
            .await
            .unwrap();
        store
            .create(make_record(CallSource::ElevenLabs, "e1", 9))
            .await
            .unwrap();

        let filter = CallFilter {
            source: Some(CallSource::ElevenLabs),
            ..Default::default()
        };
        let results = store.query(&filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].external_id, "e1");
    }

    #[tokio::test]
    async fn stats_reflects_stored_records() {
        let store = MemoryCallStore::new();
        store
            .create(make_record(CallSource::Voximplant, "a", 9))
            .await
            .unwrap();
        let mut missed = make_record(CallSource::Voximplant, "b", 10);
        missed.status = CallStatus::Missed;
        missed.sentiment = Some(Sentiment::Negative);
        store.create(missed).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_calls, 2);
        assert_eq!(stats.completed_calls, 1);
        assert_eq!(stats.missed_calls, 1);
        assert_eq!(stats.sentiment.negative, 1);
    }
}
