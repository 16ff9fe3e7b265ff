//! Single-value biometric parsing (weight, height, age)
//!
//! Metric events carry one free-text value in whichever format the
//! producing app chose. Each parser tries a fixed priority order of
//! formats, terminal on first match: whole-string JSON pass-through,
//! then format-specific patterns, then the raw-passthrough sentinel.
//! Canonical units are kg, cm, and years; the display pair is always
//! derived from the canonical value, never the reverse.

use crate::types::MetricRecord;
use once_cell::sync::Lazy;
use regex::Regex;

/// Kilograms per pound.
pub const KG_PER_LB: f64 = 0.45359237;
/// Centimeters per inch.
pub const CM_PER_IN: f64 = 2.54;

static BARE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());
static WEIGHT_LBS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(?i:lbs?|pounds?)$").unwrap());
static WEIGHT_KG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(?i:kgs?|kilograms?)$").unwrap());
static HEIGHT_FT_IN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\d)\s*'\s*(\d{1,2})\s*(?:"|'')?$"#).unwrap());
static HEIGHT_DASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d)-(\d{1,2})$").unwrap());
static HEIGHT_FT_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d)\s*'$").unwrap());
static HEIGHT_CM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(?i:cm)$").unwrap());
static AGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3})\s*(?i:years?|yrs?|y)?$").unwrap());

/// Parse a weight value. Canonical unit is kg, display pair is whole
/// pounds.
pub fn parse_weight(input: &str) -> MetricRecord {
    let input = input.trim();
    if let Some(record) = json_passthrough(input, "kg") {
        return record;
    }

    if let Some(caps) = WEIGHT_LBS_RE.captures(input) {
        if let Ok(lbs) = caps[1].parse::<f64>() {
            let kg = lbs * KG_PER_LB;
            return MetricRecord {
                value: kg.to_string(),
                unit: "kg".to_string(),
                display_value: Some(format!("{}", lbs.round())),
                display_unit: Some("lbs".to_string()),
            };
        }
    }

    let kg_value = WEIGHT_KG_RE
        .captures(input)
        .map(|caps| caps[1].to_string())
        .or_else(|| BARE_NUMBER_RE.is_match(input).then(|| input.to_string()));
    if let Some(value) = kg_value {
        if let Ok(kg) = value.parse::<f64>() {
            return MetricRecord {
                value,
                unit: "kg".to_string(),
                display_value: Some(format!("{}", (kg / KG_PER_LB).round())),
                display_unit: Some("lbs".to_string()),
            };
        }
    }

    MetricRecord::raw_passthrough(input)
}

/// Parse a height value. Canonical unit is cm, display pair is feet-inches
/// with inches rounded to the nearest whole inch.
pub fn parse_height(input: &str) -> MetricRecord {
    let input = input.trim();
    if let Some(record) = json_passthrough(input, "cm") {
        return record;
    }

    // Feet-inches, in quote ("5'11\""), dash ("5-11"), or feet-only ("6'")
    // order
    let feet_inches = HEIGHT_FT_IN_RE
        .captures(input)
        .or_else(|| HEIGHT_DASH_RE.captures(input))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .or_else(|| {
            HEIGHT_FT_ONLY_RE
                .captures(input)
                .map(|caps| (caps[1].to_string(), "0".to_string()))
        });
    if let Some((feet, inches)) = feet_inches {
        if let (Ok(ft), Ok(inch)) = (feet.parse::<u32>(), inches.parse::<u32>()) {
            let cm = f64::from(ft * 12 + inch) * CM_PER_IN;
            return MetricRecord {
                value: format_cm(cm),
                unit: "cm".to_string(),
                display_value: Some(format!("{}'{}\"", ft, inch)),
                display_unit: Some("ft-in".to_string()),
            };
        }
    }

    // Centimeter-suffixed or bare number, both canonical already
    let cm_value = HEIGHT_CM_RE
        .captures(input)
        .map(|caps| caps[1].to_string())
        .or_else(|| BARE_NUMBER_RE.is_match(input).then(|| input.to_string()));
    if let Some(value) = cm_value {
        if let Ok(cm) = value.parse::<f64>() {
            return MetricRecord {
                value,
                unit: "cm".to_string(),
                display_value: Some(cm_to_feet_inches(cm)),
                display_unit: Some("ft-in".to_string()),
            };
        }
    }

    MetricRecord::raw_passthrough(input)
}

/// Parse an age value. Canonical unit is years; no display pair.
pub fn parse_age(input: &str) -> MetricRecord {
    let input = input.trim();
    if let Some(record) = json_passthrough(input, "years") {
        return record;
    }

    if let Some(caps) = AGE_RE.captures(input) {
        return MetricRecord::canonical(&caps[1], "years");
    }

    MetricRecord::raw_passthrough(input)
}

/// Whole-string JSON object with a `value` key: use its fields directly.
fn json_passthrough(input: &str, default_unit: &str) -> Option<MetricRecord> {
    if !input.starts_with('{') {
        return None;
    }
    let serde_json::Value::Object(map) = serde_json::from_str(input).ok()? else {
        return None;
    };
    let value = match map.get("value")? {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let field_str = |key: &str| -> Option<String> {
        match map.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };
    Some(MetricRecord {
        value,
        unit: field_str("unit").unwrap_or_else(|| default_unit.to_string()),
        display_value: field_str("displayValue"),
        display_unit: field_str("displayUnit"),
    })
}

/// Round to whole inches, then split into feet and inches.
fn cm_to_feet_inches(cm: f64) -> String {
    let total_inches = (cm / CM_PER_IN).round().max(0.0) as u32;
    format!("{}'{}\"", total_inches / 12, total_inches % 12)
}

fn format_cm(cm: f64) -> String {
    if (cm - cm.round()).abs() < 1e-9 {
        format!("{:.0}", cm)
    } else {
        format!("{:.2}", cm)
    }
}
