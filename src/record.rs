//! Decoding of streamed event records.
//!
//! Only the envelope `{"data": {"id": ...}}` is read; every other field is
//! left untouched and the raw bytes are what gets stored.

use serde::Deserialize;
use std::fmt;

#[derive(Deserialize)]
struct Envelope {
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    id: String,
}

/// Why a record was not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Not JSON, or no `data.id` string.
    Malformed(String),
    /// The identifier cannot be used as a file name.
    UnsafeIdentifier(String),
    /// Decoded fine but the write failed.
    WriteFailed(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed(e) => write!(f, "malformed record: {e}"),
            RejectReason::UnsafeIdentifier(id) => write!(f, "unusable identifier '{id}'"),
            RejectReason::WriteFailed(e) => write!(f, "write failed: {e}"),
        }
    }
}

/// Extract the event identifier from one raw record.
pub fn event_id(raw: &[u8]) -> Result<String, RejectReason> {
    let envelope: Envelope =
        serde_json::from_slice(raw).map_err(|e| RejectReason::Malformed(e.to_string()))?;
    let id = envelope.data.id;
    if !is_safe_identifier(&id) {
        return Err(RejectReason::UnsafeIdentifier(id));
    }
    Ok(id)
}

fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
