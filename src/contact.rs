// Turns one contact-event record into a capture target.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

/// The media stream identity and start time derived from one contact
/// event. Dedup and session keying use `stream_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    pub stream_id: String,
    pub started_at: DateTime<Utc>,
}

/// Extract a capture target from an event record body.
///
/// The record is a JSON document carrying the stream reference at
/// `Details.ContactData.MediaStreams.Customer.Audio`. The stream ARN
/// has the shape `arn:aws:kinesisvideo:region:account:app/stream/code`,
/// so the stream id is the second `/`-delimited segment. Any missing or
/// malformed field makes the record a skip, not a pipeline error.
pub fn capture_target(record: &[u8]) -> Option<CaptureTarget> {
    let body: serde_json::Value = match serde_json::from_slice(record) {
        Ok(body) => body,
        Err(e) => {
            warn!("event record is not valid JSON: {}", e);
            return None;
        }
    };

    let audio = &body["Details"]["ContactData"]["MediaStreams"]["Customer"]["Audio"];

    let stream_arn = match audio["StreamARN"].as_str() {
        Some(arn) if !arn.is_empty() => arn,
        _ => {
            warn!("no StreamARN in event record, skipping");
            return None;
        }
    };

    let stream_id = match stream_arn.split('/').nth(1) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            warn!(arn = stream_arn, "no stream id in StreamARN, skipping");
            return None;
        }
    };

    let start_millis = match audio["StartTimestamp"].as_i64() {
        Some(ms) => ms,
        None => {
            warn!(stream_id = %stream_id, "no StartTimestamp in event record, skipping");
            return None;
        }
    };

    let started_at = match Utc.timestamp_millis_opt(start_millis).single() {
        Some(ts) => ts,
        None => {
            warn!(stream_id = %stream_id, start_millis, "StartTimestamp out of range, skipping");
            return None;
        }
    };

    Some(CaptureTarget {
        stream_id,
        started_at,
    })
}
