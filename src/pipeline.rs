//! Decoder orchestration
//!
//! One event in, one record out. Stages run in priority order and each
//! stage only fills slots the earlier stages left empty:
//!
//! 1. Tag indexing
//! 2. Structured tag mapping (incl. the legacy exercise tag)
//! 3. Free-text content heuristics
//! 4. Derivation (pace from distance + duration)
//! 5. Estimation fallback (explicitly marked `(est.)` / `"N/A"`)
//!
//! Everything is pure and synchronous; invocations share no state and are
//! safe to run concurrently across independent events.

use crate::content;
use crate::error::DecodeError;
use crate::event::{RawEvent, KIND_AGE, KIND_HEIGHT, KIND_WEIGHT, KIND_WORKOUT};
use crate::fallback;
use crate::mapper;
use crate::metrics;
use crate::tags::TagIndex;
use crate::types::{MetricRecord, WorkoutRecord};

/// Decode one workout event into a record.
///
/// Infallible by design: anything the stages cannot parse is simply left
/// unset, and the caller gets a best-effort partial record.
pub fn decode_workout(event: &RawEvent) -> WorkoutRecord {
    let mut record = WorkoutRecord::new(event.created_at);
    let index = TagIndex::new(&event.tags);

    mapper::map_structured(event, &index, &mut record);
    content::extract(&event.content, &mut record);
    fallback::derive_pace(&mut record);
    fallback::estimate(&mut record, &event.content);

    record
}

/// Decode a workout event straight from relay JSON, rejecting events of the
/// wrong kind. An event without a kind field is accepted as-is.
pub fn decode_workout_json(json: &str) -> Result<WorkoutRecord, DecodeError> {
    let event = RawEvent::from_json(json)?;
    if let Some(kind) = event.kind {
        if kind != KIND_WORKOUT {
            return Err(DecodeError::KindMismatch {
                expected: KIND_WORKOUT,
                actual: kind,
            });
        }
    }
    Ok(decode_workout(&event))
}

/// Decode a single-value metric event (weight, height, age), dispatching on
/// the event kind.
pub fn decode_metric(event: &RawEvent) -> Result<MetricRecord, DecodeError> {
    match event.kind {
        Some(KIND_WEIGHT) => Ok(metrics::parse_weight(&event.content)),
        Some(KIND_HEIGHT) => Ok(metrics::parse_height(&event.content)),
        Some(KIND_AGE) => Ok(metrics::parse_age(&event.content)),
        Some(kind) => Err(DecodeError::UnsupportedKind(kind)),
        None => Err(DecodeError::MissingKind),
    }
}

/// Decode a metric event straight from relay JSON.
pub fn decode_metric_json(json: &str) -> Result<MetricRecord, DecodeError> {
    decode_metric(&RawEvent::from_json(json)?)
}
