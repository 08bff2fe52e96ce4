//! Cross-provider reconciliation.
//!
//! A call answered by the AI agent is observed twice: once in the telephony
//! provider's history (caller number, billing cost) and once in the
//! conversation platform's log (transcript, analysis). `reconcile` pairs
//! those sightings by time proximity and folds each pair into one merged
//! record, so the unified view shows a single entry per real call.

use chrono::Duration;

use crate::types::{CallRecord, CallSource};

/// Default pairing window in seconds. Sightings further apart than this are
/// never treated as the same call.
pub const DEFAULT_MATCH_WINDOW_SECS: i64 = 300;

/// Pair telephony anchors with conversation candidates and merge each pair.
///
/// Anchors are walked in list order; each takes the FIRST unconsumed
/// candidate whose timestamp gap is strictly under `window_secs`. This is a
/// single linear pass, not a nearest-match assignment: with several
/// candidates in range, list position wins, not proximity. A candidate is
/// consumed by at most one anchor. Unmatched records from both lists pass
/// through unchanged. The result is sorted newest first; the sort is stable,
/// so equal timestamps keep their relative order.
pub fn reconcile(
    anchors: Vec<CallRecord>,
    candidates: Vec<CallRecord>,
    window_secs: i64,
) -> Vec<CallRecord> {
    let mut consumed = vec![false; candidates.len()];
    let mut result: Vec<CallRecord> = Vec::with_capacity(anchors.len() + candidates.len());

    for anchor in anchors {
        let hit = (0..candidates.len())
            .find(|&idx| !consumed[idx] && within_window(&anchor, &candidates[idx], window_secs));
        match hit {
            Some(idx) => {
                consumed[idx] = true;
                result.push(merge(anchor, &candidates[idx]));
            }
            None => result.push(anchor),
        }
    }

    for (idx, candidate) in candidates.into_iter().enumerate() {
        if !consumed[idx] {
            result.push(candidate);
        }
    }

    result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    result
}

/// Strict comparison: a gap of exactly the window does not match.
fn within_window(a: &CallRecord, b: &CallRecord, window_secs: i64) -> bool {
    (a.timestamp - b.timestamp).abs() < Duration::seconds(window_secs)
}

/// Fold a matched pair into one record. Identity fields (number, cost,
/// duration, status, timestamp) come from the anchor; content fields
/// (transcription, summary, sentiment, audio, agent) prefer the candidate
/// and fall back to the anchor.
fn merge(anchor: CallRecord, candidate: &CallRecord) -> CallRecord {
    CallRecord {
        external_id: anchor.external_id,
        source: CallSource::Merged,
        caller_number: anchor.caller_number,
        duration_seconds: anchor.duration_seconds,
        status: anchor.status,
        sentiment: candidate.sentiment.or(anchor.sentiment),
        transcription: candidate.transcription.clone().or(anchor.transcription),
        summary: candidate.summary.clone().or(anchor.summary),
        audio_url: candidate.audio_url.clone().or(anchor.audio_url),
        agent_id: candidate.agent_id.clone().or(anchor.agent_id),
        cost: anchor.cost,
        timestamp: anchor.timestamp,
        matched_external_id: Some(candidate.external_id.clone()),
    }
}
