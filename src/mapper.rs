//! Structured tag mapping
//!
//! Reads the known workout tag names and normalizes each into a typed
//! field. The tag vocabulary evolved across producer apps, so most fields
//! carry an ordered alias chain; the first alias that resolves wins and
//! later rules never overwrite a filled slot. This stage runs before the
//! content heuristics, which gives explicit tags the highest priority.

use crate::content::{distance_unit_hint, RUNSTR_MARKER};
use crate::event::RawEvent;
use crate::exercise;
use crate::tags::TagIndex;
use crate::types::{Measurement, Split, Weather, WorkoutRecord};
use crate::units::{
    format_clock, format_pace, is_clock_token, is_numeric, leading_number, parse_clock,
    parse_pace_secs, DistanceUnit,
};

const DISTANCE_ALIASES: &[&str] = &["distance", "total_distance", "dist", "length"];
const CALORIE_ALIASES: &[&str] = &["calories", "kcal", "energy", "calorie"];
const DURATION_ALIASES: &[&str] = &["duration", "time", "moving_time", "total_time"];
const PACE_ALIASES: &[&str] = &["pace", "pace_avg", "average_pace"];
const SPEED_ALIASES: &[&str] = &["speed_avg", "average_speed"];
const SOURCE_ALIASES: &[&str] = &["source", "app"];
const DISTANCE_UNIT_ALIASES: &[&str] = &["distance_type", "distance_unit"];

/// Map every recognized structured tag onto the record.
pub fn map_structured(event: &RawEvent, index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    map_identity(index, record);
    map_distance(index, record);
    map_calories(index, record);
    map_time_window(index, record);

    if let Some(tag) = index.first_tag("exercise") {
        exercise::classify_elements(tag.get(1..).unwrap_or(&[]), record);
    }

    map_duration(index, record);
    map_pace(index, record);
    map_vitals(index, record);
    map_scalars(index, record);
    map_source(event, index, record);
    map_weather(index, record);
    map_splits(index, record);
    map_flags(index, record);
}

fn map_identity(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    if let Some(id) = index.first_value("d") {
        record.id.fill(id.to_string());
    }
    if let Some(title) = index.first_value("title") {
        record.title.fill(title.to_string());
    }
    if let Some(activity) = index.first_value("type") {
        record.activity_type.fill(activity.to_string());
    }
    if let Some(notes) = index.first_value("notes") {
        record.notes.fill(notes.to_string());
    }
}

fn map_distance(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    if record.distance.is_set() {
        return;
    }
    let Some(tag) = index.first_tag_of(DISTANCE_ALIASES) else {
        return;
    };
    let Some(value) = tag.get(1).map(|v| v.trim()) else {
        return;
    };
    if value.is_empty() {
        return;
    }
    if is_numeric(value) {
        // Unit comes from the tag's third element when present
        let unit = tag
            .get(2)
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .unwrap_or("km");
        record.distance.fill(format!("{} {}", value, unit));
    } else if leading_number(value).is_some() {
        // Already carries a unit ("5.2 km"); pass through as-is
        record.distance.fill(value.to_string());
    }
    // Values with no leading number ("abc") stay unset
}

fn map_calories(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    if record.calories.is_set() {
        return;
    }
    let Some(value) = index.first_value_of(CALORIE_ALIASES) else {
        return;
    };
    let value = value.trim();
    if !is_numeric(value) {
        return;
    }
    if let Ok(kcal) = value.parse::<f64>() {
        record.calories.fill(kcal.round() as u32);
    }
}

fn map_time_window(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    if let Some(start) = index.first_value("start").and_then(|v| v.trim().parse::<i64>().ok()) {
        record.start_time.fill(start);
    }
    if let Some(end) = index.first_value("end").and_then(|v| v.trim().parse::<i64>().ok()) {
        record.end_time.fill(end);
    }
    if record.duration.is_empty() {
        if let (Some(&start), Some(&end)) = (record.start_time.get(), record.end_time.get()) {
            if end > start {
                record.duration.fill(format_clock((end - start) as u64));
            }
        }
    }
}

fn map_duration(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    // Only consulted if the exercise tag did not already yield a duration
    if record.duration.is_set() {
        return;
    }
    let Some(value) = index.first_value_of(DURATION_ALIASES) else {
        return;
    };
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if is_numeric(value) {
        if let Ok(secs) = value.parse::<f64>() {
            record.duration.fill(format_clock(secs.round() as u64));
        }
    } else if parse_clock(value).is_some() {
        // Already formatted ("31:40"); pass through unchanged
        record.duration.fill(value.to_string());
    }
    // Anything else ("abc", overflowing clock tokens) stays unset
}

fn map_pace(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    if record.pace.is_empty() {
        if let Some(tag) = index.first_tag_of(PACE_ALIASES) {
            if let Some(value) = tag.get(1).map(|v| v.trim()).filter(|v| !v.is_empty()) {
                if is_numeric(value) {
                    if let Ok(secs_per_unit) = value.parse::<f64>() {
                        let unit = tag
                            .get(2)
                            .and_then(|u| DistanceUnit::parse(u))
                            .unwrap_or_else(|| inferred_unit(index, record));
                        record.pace.fill(format_pace(secs_per_unit, unit));
                    }
                } else if parse_pace_secs(value).is_some() {
                    // Clock-shaped ("5:30" or "5:30/km"); pass through
                    record.pace.fill(value.to_string());
                }
                // Garbage ("abc") stays unset so the distance + duration
                // derivation can still run later
            }
        }
    }

    // No pace tag: derive from average speed (unit per hour -> secs per unit)
    if record.pace.is_empty() {
        if let Some(value) = index.first_value_of(SPEED_ALIASES) {
            if let Ok(speed) = value.trim().parse::<f64>() {
                if speed > 0.0 && speed.is_finite() {
                    record
                        .pace
                        .fill(format_pace(3600.0 / speed, inferred_unit(index, record)));
                }
            }
        }
    }
}

/// Unit for pace formatting: an explicit distance-unit tag wins, otherwise
/// whatever unit the distance string committed to, defaulting to km.
fn inferred_unit(index: &TagIndex<'_>, record: &WorkoutRecord) -> DistanceUnit {
    index
        .first_value_of(DISTANCE_UNIT_ALIASES)
        .and_then(DistanceUnit::parse)
        .unwrap_or_else(|| distance_unit_hint(record))
}

fn map_vitals(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    let pairs: [(&str, &str, &mut crate::slot::Slot<Measurement>); 3] = [
        ("heart_rate_avg", "bpm", &mut record.heart_rate),
        ("heart_rate_max", "bpm", &mut record.max_heart_rate),
        ("cadence_avg", "spm", &mut record.cadence),
    ];
    for (name, default_unit, slot) in pairs {
        let Some(tag) = index.first_tag(name) else {
            continue;
        };
        let Some(value) = tag
            .get(1)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
        else {
            continue;
        };
        let unit = tag
            .get(2)
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .unwrap_or(default_unit);
        slot.fill(Measurement::new(value, unit));
    }
}

fn map_scalars(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    let finite = |v: &str| v.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    if let Some(gain) = index.first_value("elevation_gain").and_then(finite) {
        record.elevation_gain.fill(gain);
    }
    if let Some(speed) = index.first_value("speed_avg").and_then(finite) {
        record.avg_speed.fill(speed);
    }
    if let Some(speed) = index.first_value("speed_max").and_then(finite) {
        record.max_speed.fill(speed);
    }
}

fn map_source(event: &RawEvent, index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    if let Some(source) = index.first_value_of(SOURCE_ALIASES) {
        record.source.fill(source.to_string());
    } else if event.content.contains(RUNSTR_MARKER) {
        record.source.fill(RUNSTR_MARKER.to_string());
    }
}

fn map_weather(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    let mut weather = Weather::default();
    if let Some(tag) = index.first_tag("weather_temp") {
        weather.temp = tag.get(1).and_then(|v| v.trim().parse().ok());
        weather.unit = tag.get(2).map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
    }
    weather.humidity = index
        .first_value("weather_humidity")
        .and_then(|v| v.trim().parse().ok());
    weather.condition = index
        .first_value("weather_condition")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    if !weather.is_empty() {
        record.weather.fill(weather);
    }
}

fn map_splits(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    let mut split_pace_secs: Vec<u64> = Vec::new();
    let mut first_unit: Option<DistanceUnit> = None;

    for tag in index.all("split") {
        // [split, number, distance, unit, time, heartRate?, ...extra]
        let number = tag
            .get(1)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(record.splits.len() as u32 + 1);
        let distance = tag.get(2).map(|v| v.trim().to_string()).unwrap_or_default();
        let unit = tag
            .get(3)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "km".to_string());
        let time = tag.get(4).map(|v| v.trim().to_string()).unwrap_or_default();
        let heart_rate = tag
            .get(5)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());

        // Trailing elements carry elevation and per-split pace in no fixed
        // position; scan them by shape.
        let extras_start = if heart_rate.is_some() { 6 } else { 5 };
        let extras = tag.get(extras_start..).unwrap_or(&[]);
        let (elevation, pace) = scan_split_extras(extras, &time);

        if first_unit.is_none() {
            first_unit = DistanceUnit::parse(&unit);
        }
        if let Some(p) = pace.as_deref().and_then(parse_pace_secs) {
            split_pace_secs.push(p);
        }

        record.splits.push(Split {
            number,
            distance,
            unit,
            time,
            heart_rate,
            elevation,
            pace,
        });
    }

    // No overall pace but per-split paces: use their arithmetic mean
    if record.pace.is_empty() && !split_pace_secs.is_empty() {
        let mean =
            split_pace_secs.iter().sum::<u64>() as f64 / split_pace_secs.len() as f64;
        let unit = first_unit.unwrap_or_else(|| inferred_unit(index, record));
        record.pace.fill(format_pace(mean, unit));
    }
}

/// Pull an elevation value (a number immediately followed by a literal `m`,
/// either fused as `"12m"` or as a separate element pair) and a pace token
/// (clock-shaped, distinct from the split time, optionally followed by a
/// unit element) out of a split's trailing elements.
fn scan_split_extras(extras: &[String], time: &str) -> (Option<f64>, Option<String>) {
    let mut elevation: Option<f64> = None;
    let mut pace: Option<String> = None;

    let mut i = 0;
    while i < extras.len() {
        let element = extras[i].trim();

        if elevation.is_none() {
            if let Some(v) = element
                .strip_suffix('m')
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
            {
                elevation = Some(v);
                i += 1;
                continue;
            }
            if extras.get(i + 1).map(|n| n.trim()) == Some("m") {
                if let Some(v) = element.parse::<f64>().ok().filter(|v| v.is_finite()) {
                    elevation = Some(v);
                    i += 2;
                    continue;
                }
            }
        }

        if pace.is_none() && is_clock_token(element) && element != time {
            let unit = extras
                .get(i + 1)
                .map(|u| u.trim())
                .and_then(DistanceUnit::parse);
            pace = Some(match unit {
                Some(unit) => {
                    i += 1;
                    format!("{}/{}", element, unit)
                }
                None => element.to_string(),
            });
        }

        i += 1;
    }

    (elevation, pace)
}

fn map_flags(index: &TagIndex<'_>, record: &mut WorkoutRecord) {
    if let Some(value) = index.first_value("completed") {
        record.completed.fill(value.trim().eq_ignore_ascii_case("true"));
    }
    for tag in index.all("t") {
        if let Some(label) = tag.get(1).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            record.tags.insert(label.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(event: &RawEvent) -> WorkoutRecord {
        let mut record = WorkoutRecord::new(event.created_at);
        let index = TagIndex::new(&event.tags);
        map_structured(event, &index, &mut record);
        record
    }

    #[test]
    fn test_identity_tags() {
        let event = RawEvent::new(0)
            .with_tag(["d", "workout-1"])
            .with_tag(["title", "Tempo Tuesday"])
            .with_tag(["type", "Running"]);
        let record = map(&event);
        assert_eq!(record.id.get().unwrap(), "workout-1");
        assert_eq!(record.title.get().unwrap(), "Tempo Tuesday");
        assert_eq!(record.activity_type.get().unwrap(), "Running");
    }

    #[test]
    fn test_distance_numeric_gets_unit() {
        let event = RawEvent::new(0).with_tag(["distance", "5.2", "km"]);
        assert_eq!(map(&event).distance.get().unwrap(), "5.2 km");

        // Default unit is km when the tag omits it
        let event = RawEvent::new(0).with_tag(["dist", "5.2"]);
        assert_eq!(map(&event).distance.get().unwrap(), "5.2 km");

        // Non-numeric values pass through as-is
        let event = RawEvent::new(0).with_tag(["distance", "5.2 mi"]);
        assert_eq!(map(&event).distance.get().unwrap(), "5.2 mi");
    }

    #[test]
    fn test_distance_alias_priority_over_event_order() {
        let event = RawEvent::new(0)
            .with_tag(["length", "3"])
            .with_tag(["total_distance", "5"]);
        assert_eq!(map(&event).distance.get().unwrap(), "5 km");
    }

    #[test]
    fn test_garbage_distance_leaves_other_fields_working() {
        let event = RawEvent::new(0)
            .with_tag(["distance", "abc"])
            .with_tag(["duration", "1800"]);
        let record = map(&event);
        // "abc" never throws; the field stays unset and the duration is
        // still computed from the other tag
        assert!(record.distance.is_empty());
        assert_eq!(record.duration.get().unwrap(), "30:00");
    }

    #[test]
    fn test_calories_numeric_only() {
        let event = RawEvent::new(0).with_tag(["calories", "412"]);
        assert_eq!(map(&event).calories.get().unwrap(), &412);

        let event = RawEvent::new(0).with_tag(["kcal", "about 400"]);
        assert!(map(&event).calories.is_empty());
    }

    #[test]
    fn test_float_grammar_extras_are_rejected() {
        // f64::parse accepts these, the decimal shape check does not
        let event = RawEvent::new(0).with_tag(["calories", "inf"]);
        assert!(map(&event).calories.is_empty());

        let event = RawEvent::new(0).with_tag(["distance", "inf"]);
        assert!(map(&event).distance.is_empty());

        let event = RawEvent::new(0).with_tag(["duration", "NaN"]);
        assert!(map(&event).duration.is_empty());

        let event = RawEvent::new(0)
            .with_tag(["speed_avg", "inf"])
            .with_tag(["heart_rate_avg", "NaN"]);
        let record = map(&event);
        assert!(record.avg_speed.is_empty());
        assert!(record.pace.is_empty());
        assert!(record.heart_rate.is_empty());
    }

    #[test]
    fn test_garbage_pace_leaves_slot_unset() {
        let event = RawEvent::new(0).with_tag(["pace", "abc"]);
        assert!(map(&event).pace.is_empty());

        // Clock-shaped values still pass through
        let event = RawEvent::new(0).with_tag(["pace", "5:30/km"]);
        assert_eq!(map(&event).pace.get().unwrap(), "5:30/km");
    }

    #[test]
    fn test_duration_from_start_end() {
        let event = RawEvent::new(0)
            .with_tag(["start", "1700000000"])
            .with_tag(["end", "1700001900"]);
        let record = map(&event);
        assert_eq!(record.start_time.get().unwrap(), &1700000000);
        assert_eq!(record.end_time.get().unwrap(), &1700001900);
        assert_eq!(record.duration.get().unwrap(), "31:40");
    }

    #[test]
    fn test_duration_from_start_end_over_an_hour() {
        let event = RawEvent::new(0)
            .with_tag(["start", "1700000000"])
            .with_tag(["end", "1700005400"]);
        assert_eq!(map(&event).duration.get().unwrap(), "1:30:00");
    }

    #[test]
    fn test_duration_passthrough_requires_clock_shape() {
        let event = RawEvent::new(0).with_tag(["duration", "31:40"]);
        assert_eq!(map(&event).duration.get().unwrap(), "31:40");

        // Clock-shaped but overflows u64 seconds; dropped, not wrapped
        let event = RawEvent::new(0).with_tag(["duration", "9999999999999999999:30"]);
        assert!(map(&event).duration.is_empty());

        let event = RawEvent::new(0).with_tag(["duration", "abc"]);
        assert!(map(&event).duration.is_empty());
    }

    #[test]
    fn test_dedicated_duration_only_after_exercise_tag() {
        // The exercise tag already yields a duration; the dedicated tag loses
        let event = RawEvent::new(0)
            .with_tag(["exercise", "id", "relay", "31:40"])
            .with_tag(["duration", "9999"]);
        assert_eq!(map(&event).duration.get().unwrap(), "31:40");
    }

    #[test]
    fn test_pace_numeric_seconds_per_unit() {
        let event = RawEvent::new(0).with_tag(["pace", "365"]);
        assert_eq!(map(&event).pace.get().unwrap(), "6:05/km");

        let event = RawEvent::new(0).with_tag(["pace_avg", "365", "mi"]);
        assert_eq!(map(&event).pace.get().unwrap(), "6:05/mi");
    }

    #[test]
    fn test_pace_unit_inferred_from_distance() {
        let event = RawEvent::new(0)
            .with_tag(["distance", "3.1", "mi"])
            .with_tag(["pace", "540"]);
        assert_eq!(map(&event).pace.get().unwrap(), "9:00/mi");

        // Explicit distance_unit tag overrides the distance string
        let event = RawEvent::new(0)
            .with_tag(["distance", "5", "km"])
            .with_tag(["distance_unit", "mi"])
            .with_tag(["pace", "540"]);
        assert_eq!(map(&event).pace.get().unwrap(), "9:00/mi");
    }

    #[test]
    fn test_pace_from_speed() {
        // 12 km/h -> 300 s/km
        let event = RawEvent::new(0).with_tag(["speed_avg", "12"]);
        let record = map(&event);
        assert_eq!(record.pace.get().unwrap(), "5:00/km");
        assert_eq!(record.avg_speed.get().unwrap(), &12.0);
    }

    #[test]
    fn test_vitals_with_default_units() {
        let event = RawEvent::new(0)
            .with_tag(["heart_rate_avg", "148"])
            .with_tag(["heart_rate_max", "176", "bpm"])
            .with_tag(["cadence_avg", "172"]);
        let record = map(&event);
        assert_eq!(record.heart_rate.get().unwrap(), &Measurement::new(148.0, "bpm"));
        assert_eq!(record.max_heart_rate.get().unwrap(), &Measurement::new(176.0, "bpm"));
        assert_eq!(record.cadence.get().unwrap(), &Measurement::new(172.0, "spm"));
    }

    #[test]
    fn test_source_falls_back_to_content_marker() {
        let event = RawEvent::new(0).with_tag(["source", "Strava"]);
        assert_eq!(map(&event).source.get().unwrap(), "Strava");

        let event = RawEvent::new(0).with_content("Done with RUNSTR!");
        assert_eq!(map(&event).source.get().unwrap(), "RUNSTR");

        let event = RawEvent::new(0).with_content("no marker here");
        assert!(map(&event).source.is_empty());
    }

    #[test]
    fn test_weather_requires_at_least_one_field() {
        let event = RawEvent::new(0)
            .with_tag(["weather_temp", "18.5", "C"])
            .with_tag(["weather_condition", "cloudy"]);
        let weather = map(&event).weather.into_inner().unwrap();
        assert_eq!(weather.temp, Some(18.5));
        assert_eq!(weather.unit.as_deref(), Some("C"));
        assert_eq!(weather.condition.as_deref(), Some("cloudy"));
        assert_eq!(weather.humidity, None);

        let event = RawEvent::new(0).with_tag(["distance", "5"]);
        assert!(map(&event).weather.is_empty());
    }

    #[test]
    fn test_splits_with_extras() {
        let event = RawEvent::new(0)
            .with_tag(["split", "1", "1", "km", "5:30", "148", "12m", "5:30", "km"])
            .with_tag(["split", "2", "1", "km", "5:50", "151", "8", "m", "5:50"]);
        let record = map(&event);
        assert_eq!(record.splits.len(), 2);

        let first = &record.splits[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.heart_rate, Some(148.0));
        assert_eq!(first.elevation, Some(12.0));
        // Pace token differs from nothing here: "5:30" equals the split time,
        // so it is not read as a pace
        assert_eq!(first.pace, None);

        let second = &record.splits[1];
        assert_eq!(second.elevation, Some(8.0));
        assert_eq!(second.pace, None);
    }

    #[test]
    fn test_record_pace_from_split_average() {
        let event = RawEvent::new(0)
            .with_tag(["split", "1", "1", "km", "5:30", "148", "5:12", "km"])
            .with_tag(["split", "2", "1", "km", "5:50", "150", "5:48", "km"]);
        let record = map(&event);
        assert_eq!(record.splits[0].pace.as_deref(), Some("5:12/km"));
        assert_eq!(record.splits[1].pace.as_deref(), Some("5:48/km"));
        // (312 + 348) / 2 = 330 -> 5:30/km
        assert_eq!(record.pace.get().unwrap(), "5:30/km");
    }

    #[test]
    fn test_completed_and_labels() {
        let event = RawEvent::new(0)
            .with_tag(["completed", "TRUE"])
            .with_tag(["t", "running"])
            .with_tag(["t", "outdoors"])
            .with_tag(["t", "running"]);
        let record = map(&event);
        assert_eq!(record.completed.get().unwrap(), &true);
        assert_eq!(record.tags.len(), 2);
        assert!(record.tags.contains("running"));

        let event = RawEvent::new(0).with_tag(["completed", "nope"]);
        assert_eq!(map(&event).completed.get().unwrap(), &false);
    }

    #[test]
    fn test_short_tags_do_not_panic() {
        let event = RawEvent::new(0)
            .with_tag(["distance"])
            .with_tag(["split", "1"])
            .with_tag(["heart_rate_avg"])
            .with_tag(["weather_temp"]);
        let record = map(&event);
        assert!(record.distance.is_empty());
        assert_eq!(record.splits.len(), 1);
        assert!(record.heart_rate.is_empty());
    }
}
