use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallSource {
    ElevenLabs,
    Voximplant,
    Merged,
}

impl std::fmt::Display for CallSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallSource::ElevenLabs => write!(f, "eleven_labs"),
            CallSource::Voximplant => write!(f, "voximplant"),
            CallSource::Merged => write!(f, "merged"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Completed,
    Missed,
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Completed => write!(f, "completed"),
            CallStatus::Missed => write!(f, "missed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

// --- Call record ---

/// A call in canonical form, whichever provider it came from.
///
/// `external_id` is the provider's own identifier and is unique within one
/// source, never across sources. Timestamps are always UTC. Stored records
/// are immutable: re-ingesting a seen id is a skip, not an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub external_id: String,
    pub source: CallSource,
    /// Absent when the provider withholds it (the conversation platform does).
    pub caller_number: Option<String>,
    pub duration_seconds: u32,
    pub status: CallStatus,
    pub sentiment: Option<Sentiment>,
    pub transcription: Option<String>,
    pub summary: Option<String>,
    pub audio_url: Option<String>,
    pub agent_id: Option<String>,
    /// Billing cost, telephony side only.
    pub cost: Option<f64>,
    /// Call start time.
    pub timestamp: DateTime<Utc>,
    /// Set only on merged records: the consumed counterpart's id.
    pub matched_external_id: Option<String>,
}

// --- Query types ---

/// Filters for querying stored calls. Every field is optional; absent means
/// "any".
#[derive(Debug, Clone, Default)]
pub struct CallFilter {
    pub search: Option<String>,
    pub status: Option<CallStatus>,
    pub source: Option<CallSource>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl CallFilter {
    /// True when the record passes every set filter. Search matches
    /// case-insensitively against the caller number and the transcription.
    pub fn matches(&self, record: &CallRecord) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let number_hit = record
                .caller_number
                .as_ref()
                .map(|n| n.to_lowercase().contains(&needle))
                .unwrap_or(false);
            let transcript_hit = record
                .transcription
                .as_ref()
                .map(|t| t.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !number_hit && !transcript_hit {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(source) = self.source {
            if record.source != source {
                return false;
            }
        }
        if let Some(from) = self.from {
            if record.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.timestamp > to {
                return false;
            }
        }
        true
    }
}

/// Sentiment counts for the stats rollup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// Aggregate counts over a set of call records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallStats {
    pub total_calls: u64,
    pub completed_calls: u64,
    pub missed_calls: u64,
    pub avg_duration_seconds: f64,
    pub sentiment: SentimentBreakdown,
}

impl CallStats {
    pub fn from_records(records: &[CallRecord]) -> Self {
        let total_calls = records.len() as u64;
        let completed_calls = records
            .iter()
            .filter(|r| r.status == CallStatus::Completed)
            .count() as u64;
        let avg_duration_seconds = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.duration_seconds as f64).sum::<f64>() / records.len() as f64
        };

        let mut sentiment = SentimentBreakdown::default();
        for record in records {
            match record.sentiment {
                Some(Sentiment::Positive) => sentiment.positive += 1,
                Some(Sentiment::Neutral) => sentiment.neutral += 1,
                Some(Sentiment::Negative) => sentiment.negative += 1,
                None => {}
            }
        }

        Self {
            total_calls,
            completed_calls,
            missed_calls: total_calls - completed_calls,
            avg_duration_seconds,
            sentiment,
        }
    }
}
