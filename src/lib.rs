//! Pulse Decode - best-effort decoder for Nostr workout and biometric events
//!
//! Community workout events on Nostr are loosely specified: the tag
//! vocabulary shifted across producer apps, numbers hide in free-text notes,
//! and whole fields go missing. This crate reconstructs structured records
//! from that wire data through a fixed-priority pipeline: tag indexing →
//! structured tag mapping → content-text heuristics → derivation →
//! explicitly-marked estimation.
//!
//! ## Modules
//!
//! - **Workout decoding**: one `RawEvent` in, one `WorkoutRecord` out
//! - **Metric parsing**: single-value biometrics (weight, height, age) with
//!   canonical + display units

pub mod content;
pub mod error;
pub mod event;
pub mod exercise;
pub mod fallback;
pub mod mapper;
pub mod metrics;
pub mod pipeline;
pub mod slot;
pub mod tags;
pub mod types;
pub mod units;

pub use error::DecodeError;
pub use event::{RawEvent, KIND_AGE, KIND_HEIGHT, KIND_WEIGHT, KIND_WORKOUT};
pub use pipeline::{decode_metric, decode_metric_json, decode_workout, decode_workout_json};
pub use slot::Slot;
pub use types::{Measurement, MetricRecord, Split, Weather, WorkoutRecord};

/// Decoder version embedded in CLI output
pub const DECODER_VERSION: &str = env!("CARGO_PKG_VERSION");
