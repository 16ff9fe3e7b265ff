//! Legacy `exercise` tag classification
//!
//! The nominal layout is `["exercise", id, relay, distance, duration, pace,
//! route, calories]`, but producers never agreed on it: elements go missing,
//! swap positions, and some apps emitted a nested stringified array in place
//! of a scalar. Positions cannot be trusted, so every element from index 1
//! onward is classified independently by shape, recursing into embedded
//! arrays so the same rules apply at both levels.
//!
//! Classification is first-match-wins per element, and a category already
//! filled on the record is never overwritten by a later element.

use crate::content::distance_unit_hint;
use crate::types::WorkoutRecord;
use crate::units::{format_clock, is_clock_token, parse_clock, DistanceUnit};
use once_cell::sync::Lazy;
use regex::Regex;

/// Bare integers in this open interval are read as a duration in seconds.
const DURATION_SECS_MIN: u64 = 30;
const DURATION_SECS_MAX: u64 = 86400;

/// Bare integers in this closed range are calorie candidates.
const CALORIES_MIN: u64 = 50;
const CALORIES_MAX: u64 = 5000;

/// Upper bound for accepting a bare integer as calories when no duration has
/// been found yet. Historical disambiguation heuristic (small calorie counts
/// vs duration-in-seconds); tunable, not a derived law.
pub const CALORIE_AMBIGUITY_MAX: u64 = 2000;

static DISTANCE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(km|mi|m)?$").unwrap());

/// Long alphanumeric-with-symbols strings are encoded route polylines.
static ROUTE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/=_@\\~`^|.?\{\}\[\]-]{21,}$").unwrap());

/// Classify every element of an exercise tag (minus the leading name).
pub fn classify_elements(elements: &[String], record: &mut WorkoutRecord) {
    for element in elements {
        classify_element(element.trim(), record);
    }
}

fn classify_element(element: &str, record: &mut WorkoutRecord) {
    if element.is_empty() {
        return;
    }

    // A stringified JSON array gets unwrapped and its members classified by
    // the same rules.
    if element.starts_with('[') && element.ends_with(']') {
        if let Ok(nested) = serde_json::from_str::<Vec<serde_json::Value>>(element) {
            for value in nested {
                match value {
                    serde_json::Value::String(s) => classify_element(s.trim(), record),
                    serde_json::Value::Number(n) => classify_element(&n.to_string(), record),
                    _ => {}
                }
            }
            return;
        }
    }

    classify_scalar(element, record);
}

fn classify_scalar(element: &str, record: &mut WorkoutRecord) {
    // Distance: needs an explicit unit or a decimal point. A bare integer
    // falls through to the duration/calories rules below, which would
    // otherwise be unreachable.
    if let Some(caps) = DISTANCE_SHAPE.captures(element) {
        let unit = caps.get(2).map(|m| m.as_str());
        if unit.is_some() || caps[1].contains('.') {
            if record.distance.is_empty() {
                if let Ok(value) = caps[1].parse::<f64>() {
                    let (value, unit) = match unit {
                        Some("mi") => (value, DistanceUnit::Mi),
                        // Meters normalize to km
                        Some("m") => (value / 1000.0, DistanceUnit::Km),
                        _ => (value, DistanceUnit::Km),
                    };
                    record.distance.fill(format!("{} {}", value, unit));
                }
            }
            return;
        }
    }

    // Time-shaped: duration first, then pace if a (different) duration is
    // already known.
    if is_clock_token(element) {
        if let Some(secs) = parse_clock(element) {
            let canonical = format_clock(secs);
            if record.duration.is_empty() {
                record.duration.fill(canonical);
            } else if record.pace.is_empty()
                && record.duration.get().map(String::as_str) != Some(canonical.as_str())
            {
                let unit = distance_unit_hint(record);
                record.pace.fill(format!("{}/{}", canonical, unit));
            }
        }
        return;
    }

    if let Ok(n) = element.parse::<u64>() {
        if record.duration.is_empty() && n > DURATION_SECS_MIN && n < DURATION_SECS_MAX {
            record.duration.fill(format_clock(n));
            return;
        }
        if record.calories.is_empty()
            && (CALORIES_MIN..=CALORIES_MAX).contains(&n)
            && (record.duration.is_set() || n <= CALORIE_AMBIGUITY_MAX)
        {
            record.calories.fill(n as u32);
        }
        return;
    }

    if record.route_data.is_empty() && element.len() > 20 && ROUTE_SHAPE.is_match(element) {
        record.route_data.fill(element.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(elements: &[&str]) -> WorkoutRecord {
        let mut record = WorkoutRecord::new(0);
        let owned: Vec<String> = elements.iter().map(|s| s.to_string()).collect();
        classify_elements(&owned, &mut record);
        record
    }

    #[test]
    fn test_nominal_layout() {
        let record = classify(&[
            "workout-uuid",
            "wss://relay.example.com",
            "5.2km",
            "31:40",
            "6:05",
            "u{~vFvyys@fS]cS_@",
            "412",
        ]);
        assert_eq!(record.distance.get().unwrap(), "5.2 km");
        assert_eq!(record.duration.get().unwrap(), "31:40");
        assert_eq!(record.pace.get().unwrap(), "6:05/km");
        assert_eq!(record.calories.get().unwrap(), &412);
    }

    #[test]
    fn test_nested_stringified_array() {
        let record = classify(&[r#"["5.2", "31:40", 412]"#]);
        assert_eq!(record.distance.get().unwrap(), "5.2 km");
        assert_eq!(record.duration.get().unwrap(), "31:40");
        assert_eq!(record.calories.get().unwrap(), &412);
    }

    #[test]
    fn test_time_token_after_duration_becomes_pace() {
        let record = classify(&["31:40", "6:05"]);
        assert_eq!(record.duration.get().unwrap(), "31:40");
        assert_eq!(record.pace.get().unwrap(), "6:05/km");

        // Same value as the duration is not re-read as pace
        let record = classify(&["31:40", "31:40"]);
        assert!(record.pace.is_empty());
    }

    #[test]
    fn test_bare_seconds_become_duration() {
        let record = classify(&["1800"]);
        assert_eq!(record.duration.get().unwrap(), "30:00");

        let record = classify(&["5400"]);
        assert_eq!(record.duration.get().unwrap(), "1:30:00");
    }

    #[test]
    fn test_calorie_ambiguity_rule() {
        // 1800 with no duration present is consumed by the duration rule,
        // never accepted as calories
        let record = classify(&["1800"]);
        assert!(record.calories.is_empty());

        // With a duration already found, 1800 is calories
        let record = classify(&["31:40", "1800"]);
        assert_eq!(record.duration.get().unwrap(), "31:40");
        assert_eq!(record.calories.get().unwrap(), &1800);
    }

    #[test]
    fn test_meters_normalize_to_km() {
        let record = classify(&["5200 m"]);
        assert_eq!(record.distance.get().unwrap(), "5.2 km");
    }

    #[test]
    fn test_route_polyline() {
        let record = classify(&["u{~vFvyys@fS]cS_@dT_AzCkB"]);
        assert_eq!(
            record.route_data.get().unwrap(),
            "u{~vFvyys@fS]cS_@dT_AzCkB"
        );

        // Short tokens are never mistaken for route data
        let record = classify(&["abcdef"]);
        assert!(record.route_data.is_empty());
    }

    #[test]
    fn test_filled_categories_are_not_overwritten() {
        let record = classify(&["5.2km", "3.1mi", "31:40", "412", "900"]);
        assert_eq!(record.distance.get().unwrap(), "5.2 km");
        assert_eq!(record.duration.get().unwrap(), "31:40");
        assert_eq!(record.calories.get().unwrap(), &412);
    }

    #[test]
    fn test_garbage_elements_are_ignored() {
        let record = classify(&["", "???", "km", "[broken json", "-5"]);
        assert!(record.distance.is_empty());
        assert!(record.duration.is_empty());
        assert!(record.calories.is_empty());
    }
}
