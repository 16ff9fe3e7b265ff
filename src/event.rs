//! Nostr event schema
//!
//! Events arrive from the relay layer as loosely-structured JSON. Tags are
//! positional string arrays with no format guarantees: the same logical
//! field may appear under several historical names, with missing elements,
//! or not at all. Everything downstream of this module is best-effort.

use crate::error::DecodeError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Kind number for workout records (NIP-101e).
pub const KIND_WORKOUT: u32 = 1301;
/// Kind number for weight metrics (NIP-101h).
pub const KIND_WEIGHT: u32 = 1351;
/// Kind number for height metrics (NIP-101h).
pub const KIND_HEIGHT: u32 = 1352;
/// Kind number for age metrics (NIP-101h).
pub const KIND_AGE: u32 = 1356;

/// A raw Nostr event as delivered by the relay layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event id (hex), assigned by the producer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Author public key (hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<String>,
    /// Creation time (unix seconds)
    pub created_at: i64,
    /// Event kind number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<u32>,
    /// Free-text content (human-authored note, sometimes with embedded JSON)
    #[serde(default)]
    pub content: String,
    /// Positional tag arrays; first element is the tag name
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
}

impl RawEvent {
    /// Create a bare event with the given creation time.
    pub fn new(created_at: i64) -> Self {
        RawEvent {
            id: None,
            pubkey: None,
            created_at,
            kind: None,
            content: String::new(),
            tags: Vec::new(),
        }
    }

    /// Set the event kind.
    pub fn with_kind(mut self, kind: u32) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the content field.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Append one tag array.
    pub fn with_tag<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.push(parts.into_iter().map(Into::into).collect());
        self
    }

    /// Parse an event from relay JSON.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Creation time as a UTC datetime, if representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}
