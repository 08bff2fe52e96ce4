//! Provider payload normalization.
//!
//! Pure functions from provider wire types to canonical records. All the
//! mapping policy lives here (status and sentiment heuristics, transcript
//! joining, timestamp parsing), so it is testable without any network.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use callwatch_core::{CallRecord, CallSource, CallStatus, Sentiment};
use elevenlabs_client::{ConversationSummary, TranscriptTurn};
use voximplant_client::CallHistoryItem;

/// Why a payload item was dropped. Always a single-record condition.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("record has no external id")]
    MissingId,

    #[error("record has no usable timestamp: {0}")]
    BadTimestamp(String),
}

// --- Truth tables ---

/// Conversation status: only an explicit "completed" counts, anything else
/// (including unknown or future values) reads as missed.
pub fn conversation_status(raw: Option<&str>) -> CallStatus {
    match raw {
        Some("completed") => CallStatus::Completed,
        _ => CallStatus::Missed,
    }
}

/// Conversation sentiment: "success" reads positive, anything else neutral.
pub fn conversation_sentiment(call_successful: Option<&str>) -> Sentiment {
    match call_successful {
        Some("success") => Sentiment::Positive,
        _ => Sentiment::Neutral,
    }
}

/// History status: connected for a nonzero duration and not explicitly
/// flagged unsuccessful.
pub fn history_status(duration: i64, successful: Option<bool>) -> CallStatus {
    if duration > 0 && successful != Some(false) {
        CallStatus::Completed
    } else {
        CallStatus::Missed
    }
}

/// History sentiment: neutral when connected, negative when missed. The
/// telephony side never reads positive.
pub fn history_sentiment(status: CallStatus) -> Sentiment {
    match status {
        CallStatus::Completed => Sentiment::Neutral,
        CallStatus::Missed => Sentiment::Negative,
    }
}

/// Join transcript turns as "role: message" lines in original order. An
/// empty transcript joins to an empty string, not an error.
pub fn join_transcript(turns: &[TranscriptTurn]) -> String {
    turns
        .iter()
        .map(|t| {
            format!(
                "{}: {}",
                t.role.as_deref().unwrap_or("unknown"),
                t.message.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// --- Timestamps ---

/// Unix seconds to UTC.
pub fn timestamp_from_unix(secs: i64) -> Result<DateTime<Utc>, NormalizeError> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| NormalizeError::BadTimestamp(secs.to_string()))
}

/// Parse the telephony timestamp. RFC 3339 offsets are honored and converted
/// to UTC; the bare "YYYY-MM-DD HH:MM:SS" form the platform emits is read as
/// UTC.
pub fn timestamp_from_history(raw: &str) -> Result<DateTime<Utc>, NormalizeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| NormalizeError::BadTimestamp(raw.to_string()))
}

// --- Record mapping ---

/// Normalize one conversation list item. The list view carries no caller
/// number (the platform withholds it) and no transcript; transcript
/// enrichment comes from a later detail fetch.
pub fn conversation_record(conv: &ConversationSummary) -> Result<CallRecord, NormalizeError> {
    let external_id = conv
        .conversation_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or(NormalizeError::MissingId)?;
    let secs = conv
        .start_time_unix_secs
        .ok_or_else(|| NormalizeError::BadTimestamp("missing".to_string()))?;
    let timestamp = timestamp_from_unix(secs)?;

    Ok(CallRecord {
        external_id,
        source: CallSource::ElevenLabs,
        caller_number: None,
        duration_seconds: conv.duration_secs.unwrap_or(0).max(0) as u32,
        status: conversation_status(conv.status.as_deref()),
        sentiment: Some(conversation_sentiment(conv.call_successful.as_deref())),
        transcription: None,
        summary: conv.transcript_summary.clone(),
        audio_url: None,
        agent_id: conv.agent_id.clone(),
        cost: None,
        timestamp,
        matched_external_id: None,
    })
}

/// Normalize one call history item.
pub fn history_record(item: &CallHistoryItem) -> Result<CallRecord, NormalizeError> {
    let external_id = item
        .call_session_history_id
        .map(|id| id.to_string())
        .ok_or(NormalizeError::MissingId)?;
    let raw_ts = item
        .start_date
        .as_deref()
        .ok_or_else(|| NormalizeError::BadTimestamp("missing".to_string()))?;
    let timestamp = timestamp_from_history(raw_ts)?;
    let duration = item.duration.unwrap_or(0);
    let status = history_status(duration, item.successful);

    Ok(CallRecord {
        external_id,
        source: CallSource::Voximplant,
        caller_number: item.remote_number.clone(),
        duration_seconds: duration.max(0) as u32,
        status,
        sentiment: Some(history_sentiment(status)),
        transcription: None,
        summary: None,
        audio_url: item.record_url.clone(),
        agent_id: None,
        cost: item.cost,
        timestamp,
        matched_external_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn make_conversation(id: &str) -> ConversationSummary {
        ConversationSummary {
            conversation_id: Some(id.to_string()),
            agent_id: Some("agent_1".to_string()),
            start_time_unix_secs: Some(1_772_366_400),
            duration_secs: Some(95),
            status: Some("completed".to_string()),
            call_successful: Some("success".to_string()),
            transcript_summary: Some("Caller asked about hours".to_string()),
        }
    }

    fn make_history_item(id: i64) -> CallHistoryItem {
        CallHistoryItem {
            call_session_history_id: Some(id),
            remote_number: Some("+15550001111".to_string()),
            duration: Some(42),
            successful: Some(true),
            record_url: Some("https://records.example/1.mp3".to_string()),
            cost: Some(0.05),
            start_date: Some("2026-03-01 12:00:00".to_string()),
        }
    }

    // --- Truth tables ---

    #[test]
    fn conversation_status_only_completed_counts() {
        assert_eq!(conversation_status(Some("completed")), CallStatus::Completed);
        assert_eq!(conversation_status(Some("done")), CallStatus::Missed);
        assert_eq!(conversation_status(Some("failed")), CallStatus::Missed);
        assert_eq!(conversation_status(None), CallStatus::Missed);
    }

    #[test]
    fn conversation_sentiment_success_reads_positive() {
        assert_eq!(conversation_sentiment(Some("success")), Sentiment::Positive);
        assert_eq!(conversation_sentiment(Some("failure")), Sentiment::Neutral);
        assert_eq!(conversation_sentiment(None), Sentiment::Neutral);
    }

    #[test]
    fn history_status_needs_duration_and_no_failure_flag() {
        assert_eq!(history_status(10, Some(true)), CallStatus::Completed);
        assert_eq!(history_status(10, None), CallStatus::Completed);
        assert_eq!(history_status(10, Some(false)), CallStatus::Missed);
        assert_eq!(history_status(0, Some(true)), CallStatus::Missed);
        assert_eq!(history_status(0, None), CallStatus::Missed);
    }

    #[test]
    fn history_sentiment_never_positive() {
        assert_eq!(history_sentiment(CallStatus::Completed), Sentiment::Neutral);
        assert_eq!(history_sentiment(CallStatus::Missed), Sentiment::Negative);
    }

    #[test]
    fn transcript_joins_turns_in_order() {
        let turns = vec![
            TranscriptTurn {
                role: Some("agent".to_string()),
                message: Some("Hello".to_string()),
            },
            TranscriptTurn {
                role: Some("user".to_string()),
                message: Some("Hi there".to_string()),
            },
        ];
        assert_eq!(join_transcript(&turns), "agent: Hello\nuser: Hi there");
    }

    #[test]
    fn empty_transcript_joins_to_empty_string() {
        assert_eq!(join_transcript(&[]), "");
    }

    // --- Timestamps ---

    #[test]
    fn unix_seconds_parse_to_utc() {
        let ts = timestamp_from_unix(1_772_366_400).unwrap();
        assert_eq!(ts, Utc.timestamp_opt(1_772_366_400, 0).unwrap());
    }

    #[test]
    fn bare_history_timestamp_is_read_as_utc() {
        let ts = timestamp_from_history("2026-03-01 12:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn rfc3339_offset_is_converted_to_utc() {
        let ts = timestamp_from_history("2026-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn garbage_timestamp_is_an_error() {
        assert!(timestamp_from_history("yesterday").is_err());
    }

    // --- Record mapping ---

    #[test]
    fn conversation_maps_to_canonical_record() {
        let record = conversation_record(&make_conversation("conv_1")).unwrap();
        assert_eq!(record.external_id, "conv_1");
        assert_eq!(record.source, CallSource::ElevenLabs);
        assert_eq!(record.caller_number, None, "platform withholds the number");
        assert_eq!(record.duration_seconds, 95);
        assert_eq!(record.status, CallStatus::Completed);
        assert_eq!(record.sentiment, Some(Sentiment::Positive));
        assert_eq!(record.summary.as_deref(), Some("Caller asked about hours"));
        assert_eq!(record.cost, None);
    }

    #[test]
    fn conversation_without_id_is_rejected() {
        let mut conv = make_conversation("conv_1");
        conv.conversation_id = None;
        assert!(matches!(
            conversation_record(&conv),
            Err(NormalizeError::MissingId)
        ));

        conv.conversation_id = Some(String::new());
        assert!(conversation_record(&conv).is_err());
    }

    #[test]
    fn conversation_without_timestamp_is_rejected() {
        let mut conv = make_conversation("conv_1");
        conv.start_time_unix_secs = None;
        assert!(matches!(
            conversation_record(&conv),
            Err(NormalizeError::BadTimestamp(_))
        ));
    }

    #[test]
    fn conversation_missing_duration_defaults_to_zero() {
        let mut conv = make_conversation("conv_1");
        conv.duration_secs = None;
        assert_eq!(conversation_record(&conv).unwrap().duration_seconds, 0);
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        let mut conv = make_conversation("conv_1");
        conv.duration_secs = Some(-30);
        assert_eq!(conversation_record(&conv).unwrap().duration_seconds, 0);
    }

    #[test]
    fn history_item_maps_to_canonical_record() {
        let record = history_record(&make_history_item(42)).unwrap();
        assert_eq!(record.external_id, "42");
        assert_eq!(record.source, CallSource::Voximplant);
        assert_eq!(record.caller_number.as_deref(), Some("+15550001111"));
        assert_eq!(record.status, CallStatus::Completed);
        assert_eq!(record.sentiment, Some(Sentiment::Neutral));
        assert_eq!(record.transcription, None, "history has no transcript");
        assert_eq!(record.cost, Some(0.05));
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn missed_history_item_reads_negative() {
        let mut item = make_history_item(42);
        item.duration = Some(0);
        let record = history_record(&item).unwrap();
        assert_eq!(record.status, CallStatus::Missed);
        assert_eq!(record.sentiment, Some(Sentiment::Negative));
    }

    #[test]
    fn history_item_without_session_id_is_rejected() {
        let mut item = make_history_item(42);
        item.call_session_history_id = None;
        assert!(matches!(
            history_record(&item),
            Err(NormalizeError::MissingId)
        ));
    }

    #[test]
    fn history_item_with_bad_date_is_rejected() {
        let mut item = make_history_item(42);
        item.start_date = Some("03/01/2026".to_string());
        assert!(history_record(&item).is_err());
    }
}
