//! Free-text content heuristics
//!
//! A lower-priority source than structured tags: older producer apps put
//! the only usable numbers in the human-authored note ("Ran 5.3 km, pace
//! 5:58/km"). Every extractor here fills only slots that are still unset,
//! and an unmatched pattern simply leaves the field for a later stage.
//! Nothing in this module can fail.

use crate::types::WorkoutRecord;
use crate::units::{format_clock, format_pace, parse_clock, DistanceUnit};
use once_cell::sync::Lazy;
use regex::Regex;

/// Case-sensitive marker emitted by the RUNSTR app.
pub(crate) const RUNSTR_MARKER: &str = "RUNSTR";
/// Default title/type applied when content reads like a run.
pub(crate) const RUNNING_TYPE: &str = "Running";
pub(crate) const DEFAULT_RUN_TITLE: &str = "Run";

static DISTANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(km|kms|kilometers?|mi|miles?)\b").unwrap()
});

static PACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bpace\b[:\s]*(\d{1,2}:\d{2})\s*(?:/|per\s+)?\s*(km|kms|kilometers?|mi|miles?)?").unwrap()
});

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:time|duration)\b[:\s]*(\d{1,2}:\d{2}(?::\d{2})?|\d{1,5})").unwrap()
});

static CALORIES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s*(?:kcal|calories|cals)\b").unwrap());

static RUNNING_VOCAB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:run|running|ran|jog|jogging)\b").unwrap());

/// Scan the content field and fill any slots the structured mapper left
/// empty.
pub fn extract(content: &str, record: &mut WorkoutRecord) {
    if content.is_empty() {
        return;
    }

    if record.distance.is_empty() {
        if let Some(caps) = DISTANCE_RE.captures(content) {
            if let Some(unit) = caps.get(2).and_then(|m| DistanceUnit::parse(m.as_str())) {
                record.distance.fill(format!("{} {}", &caps[1], unit));
            }
        }
    }

    if record.pace.is_empty() {
        if let Some(caps) = PACE_RE.captures(content) {
            let unit = caps
                .get(2)
                .and_then(|m| DistanceUnit::parse(m.as_str()))
                .unwrap_or_else(|| distance_unit_hint(record));
            record.pace.fill(format!("{}/{}", &caps[1], unit));
        }
    }

    if record.duration.is_empty() {
        if let Some(caps) = DURATION_RE.captures(content) {
            if let Some(secs) = parse_clock(&caps[1]) {
                record.duration.fill(format_clock(secs));
            }
        }
    }

    if record.calories.is_empty() {
        if let Some(caps) = CALORIES_RE.captures(content) {
            if let Ok(kcal) = caps[1].parse::<u32>() {
                record.calories.fill(kcal);
            }
        }
    }

    extract_embedded_json(content, record);

    if content.contains(RUNSTR_MARKER) || RUNNING_VOCAB_RE.is_match(content) {
        record.activity_type.fill(RUNNING_TYPE.to_string());
        record.title.fill(DEFAULT_RUN_TITLE.to_string());
    }
}

/// Unit the record has already committed to, for internally-consistent pace
/// formatting.
pub(crate) fn distance_unit_hint(record: &WorkoutRecord) -> DistanceUnit {
    match record.distance.get() {
        Some(d) if d.contains("mi") => DistanceUnit::Mi,
        _ => DistanceUnit::Km,
    }
}

/// Locate the first `{` and last `}` and try to parse the substring as a
/// JSON object. Some producers embed a JSON fragment inside the note; a
/// parse failure is silently ignored, this is best-effort only.
fn extract_embedded_json(content: &str, record: &mut WorkoutRecord) {
    let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
        return;
    };
    if start >= end {
        return;
    }
    let Ok(serde_json::Value::Object(map)) =
        serde_json::from_str::<serde_json::Value>(&content[start..=end])
    else {
        return;
    };

    if record.distance.is_empty() {
        match map.get("distance") {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                let s = s.trim();
                if s.parse::<f64>().is_ok() {
                    record.distance.fill(format!("{} km", s));
                } else {
                    record.distance.fill(s.to_string());
                }
            }
            Some(serde_json::Value::Number(n)) => {
                record.distance.fill(format!("{} km", n));
            }
            _ => {}
        }
    }

    if record.pace.is_empty() {
        match map.get("pace") {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                record.pace.fill(s.trim().to_string());
            }
            Some(serde_json::Value::Number(n)) => {
                if let Some(secs) = n.as_f64() {
                    record
                        .pace
                        .fill(format_pace(secs, distance_unit_hint(record)));
                }
            }
            _ => {}
        }
    }

    if record.calories.is_empty() {
        if let Some(kcal) = map.get("calories").and_then(|v| v.as_f64()) {
            if kcal >= 0.0 {
                record.calories.fill(kcal.round() as u32);
            }
        }
    }
}
