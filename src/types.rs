//! Output records produced by the decoder
//!
//! A `WorkoutRecord` is accumulated across the decoding stages and handed to
//! the caller fully populated; it is never mutated after return. All
//! optional fields are write-once [`Slot`]s so that later, lower-priority
//! stages can never overwrite what an earlier stage established.
//!
//! Estimated values carry an explicit `(est.)` suffix and unknown-but-
//! acknowledged values use the `"N/A"` sentinel, so consumers can always
//! tell measured data from inferred data.

use crate::slot::Slot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A value with its measurement unit (heart rate, cadence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
}

impl Measurement {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Measurement {
            value,
            unit: unit.into(),
        }
    }
}

/// Weather conditions recorded alongside a workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Weather {
    pub fn is_empty(&self) -> bool {
        self.temp.is_none()
            && self.unit.is_none()
            && self.humidity.is_none()
            && self.condition.is_none()
    }
}

/// A per-segment record within a workout (e.g. one kilometer).
///
/// Splits keep their source order; they are not required to be contiguous
/// or sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub number: u32,
    pub distance: String,
    pub unit: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,
}

/// Decoded workout record.
///
/// `duration` is formatted `M:SS` or `H:MM:SS`; `distance` is
/// `"<number> <unit>"` with unit km or mi; `pace` is `"<M:SS>/<unit>"`.
/// Each of the three carries an `(est.)` suffix when it came from the
/// estimation fallback rather than observed or derived data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    /// Event creation time (unix seconds); set once, never overwritten
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub id: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub title: Slot<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Slot::is_empty")]
    pub activity_type: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub source: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub notes: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub start_time: Slot<i64>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub end_time: Slot<i64>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub duration: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub distance: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub pace: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub calories: Slot<u32>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub elevation_gain: Slot<f64>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub avg_speed: Slot<f64>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub max_speed: Slot<f64>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub heart_rate: Slot<Measurement>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub max_heart_rate: Slot<Measurement>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub cadence: Slot<Measurement>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub weather: Slot<Weather>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<Split>,
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub completed: Slot<bool>,
    /// Activity labels collected from `t` tags (e.g. "running")
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Opaque encoded route polyline, passed through unparsed
    #[serde(default, skip_serializing_if = "Slot::is_empty")]
    pub route_data: Slot<String>,
}

impl WorkoutRecord {
    /// Create an empty record stamped with the event's creation time.
    pub fn new(timestamp: i64) -> Self {
        WorkoutRecord {
            timestamp,
            ..Default::default()
        }
    }
}

/// Decoded single-value biometric (weight, height, age).
///
/// `value`/`unit` always hold the canonical storage unit (kg, cm, years).
/// `display_value`/`display_unit` are a derived human-friendly alternate
/// representation (lbs, ft-in), computed deterministically from the
/// canonical value - never the reverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub value: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_unit: Option<String>,
}

impl MetricRecord {
    /// Canonical value without a display pair.
    pub fn canonical(value: impl Into<String>, unit: impl Into<String>) -> Self {
        MetricRecord {
            value: value.into(),
            unit: unit.into(),
            display_value: None,
            display_unit: None,
        }
    }

    /// Non-match sentinel: the raw input passed through with an empty unit.
    pub fn raw_passthrough(input: impl Into<String>) -> Self {
        MetricRecord::canonical(input, "")
    }
}
