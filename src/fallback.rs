//! Derivation and estimation fallback
//!
//! Last stage of the pipeline; only touches fields still unset after the
//! structured mapper and the content heuristics. Derived values come from
//! other observed fields (pace from distance + duration); estimates come
//! from fixed heuristic constants and always carry the `(est.)` suffix so
//! downstream consumers can tell them from measured data. This stage never
//! fails.

use crate::content::{DEFAULT_RUN_TITLE, RUNNING_TYPE};
use crate::types::WorkoutRecord;
use crate::units::{format_pace, leading_number, parse_clock, DistanceUnit};
use once_cell::sync::Lazy;
use regex::Regex;

/// Assumed pace when estimating distance from duration alone: 7:30 per km.
/// Arbitrary historical default, kept for compatibility; not domain truth.
pub const ASSUMED_PACE_SECS_PER_KM: u64 = 450;
/// Assumed burn rate when estimating calories from duration alone.
pub const ASSUMED_KCAL_PER_MIN: f64 = 10.0;
/// Smallest distance estimate worth emitting.
const MIN_ESTIMATED_KM: f64 = 0.1;

/// Explicitly-unknown sentinel, distinct from "not yet computed".
pub const NOT_AVAILABLE: &str = "N/A";

static COMPLETED_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcompleted\s+a\s+run\b").unwrap());

/// Derive pace from distance + duration when no direct pace was found.
///
/// Runs after the content extractor so a content-sourced distance can feed
/// the derivation. The pace unit follows whatever unit the distance string
/// committed to.
pub fn derive_pace(record: &mut WorkoutRecord) {
    if record.pace.is_set() {
        return;
    }
    let (Some(distance), Some(duration)) = (record.distance.get(), record.duration.get()) else {
        return;
    };
    if duration == NOT_AVAILABLE {
        return;
    }
    let Some(dist) = leading_number(distance) else {
        return;
    };
    let Some(secs) = parse_clock(duration) else {
        return;
    };
    if dist <= 0.0 || secs == 0 {
        return;
    }
    let unit = if distance.contains("mi") {
        DistanceUnit::Mi
    } else {
        DistanceUnit::Km
    };
    record.pace.fill(format_pace(secs as f64 / dist, unit));
}

/// Estimate still-missing fields from the duration, or acknowledge the
/// workout as explicitly unknown when the content claims a run happened but
/// no duration was ever found.
pub fn estimate(record: &mut WorkoutRecord, content: &str) {
    let duration_secs = record
        .duration
        .get()
        .filter(|d| d.as_str() != NOT_AVAILABLE)
        .and_then(|d| parse_clock(d));

    let Some(secs) = duration_secs else {
        if COMPLETED_RUN_RE.is_match(content) && record.duration.is_empty() {
            record.activity_type.fill(RUNNING_TYPE.to_string());
            record.title.fill(DEFAULT_RUN_TITLE.to_string());
            record.duration.fill(NOT_AVAILABLE.to_string());
            record.distance.fill(NOT_AVAILABLE.to_string());
        }
        return;
    };

    let minutes = secs as f64 / 60.0;

    if record.distance.is_empty() {
        let estimated_km = minutes / (ASSUMED_PACE_SECS_PER_KM as f64 / 60.0);
        if estimated_km >= MIN_ESTIMATED_KM {
            record.distance.fill(format!("~{:.1} km (est.)", estimated_km));
            record.pace.fill(format!(
                "{} (est.)",
                format_pace(ASSUMED_PACE_SECS_PER_KM as f64, DistanceUnit::Km)
            ));
        }
    }

    if record.calories.is_empty() {
        record
            .calories
            .fill((minutes * ASSUMED_KCAL_PER_MIN).round() as u32);
    }
}
