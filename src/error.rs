//! Error types for Pulse Decode

use thiserror::Error;

/// Errors raised at the crate boundary.
///
/// Field-level parse failures inside the decoder are never surfaced as
/// errors: a value that fails to parse leaves its output field unset and the
/// remaining stages keep going. These variants cover collaborator misuse
/// only (malformed event JSON, wrong event kind).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid event JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unexpected event kind: expected {expected}, got {actual}")]
    KindMismatch { expected: u32, actual: u32 },

    #[error("Unsupported metric kind: {0}")]
    UnsupportedKind(u32),

    #[error("Event has no kind field; cannot dispatch decoding")]
    MissingKind,
}
