//! Unit vocabulary and clock/pace formatting
//!
//! Shared by the structured mapper, the content heuristics, and the
//! fallback stage so that distance, duration, and pace always render the
//! same way no matter which stage produced them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Distance unit established for a record. Once set via distance, pace must
/// use the same unit unless an explicit distance-unit tag overrides it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceUnit {
    #[default]
    Km,
    Mi,
}

impl DistanceUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Mi => "mi",
        }
    }

    /// Tolerant parse over the unit spellings seen in the wild.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kms" | "kilometer" | "kilometers" => Some(DistanceUnit::Km),
            "mi" | "mile" | "miles" => Some(DistanceUnit::Mi),
            _ => None,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static CLOCK_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}(?::\d{2})?$").unwrap());

/// Whether a token is `M:SS` or `H:MM:SS` shaped.
pub fn is_clock_token(s: &str) -> bool {
    CLOCK_TOKEN.is_match(s.trim())
}

/// Format seconds as `M:SS` under an hour, `H:MM:SS` at or over.
pub fn format_clock(total_secs: u64) -> String {
    if total_secs >= 3600 {
        format!(
            "{}:{:02}:{:02}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60
        )
    } else {
        format!("{}:{:02}", total_secs / 60, total_secs % 60)
    }
}

/// Parse `H:MM:SS`, `M:SS`, or bare seconds into seconds. Values whose
/// total would not fit in a `u64` are rejected, not wrapped.
pub fn parse_clock(s: &str) -> Option<u64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    let nums: Option<Vec<u64>> = parts.iter().map(|p| p.parse().ok()).collect();
    match nums?.as_slice() {
        [secs] => Some(*secs),
        [mins, secs] if *secs < 60 => mins.checked_mul(60)?.checked_add(*secs),
        [hours, mins, secs] if *mins < 60 && *secs < 60 => {
            hours.checked_mul(3600)?.checked_add(mins * 60 + secs)
        }
        _ => None,
    }
}

/// Format seconds-per-unit as `"M:SS/unit"`.
pub fn format_pace(secs_per_unit: f64, unit: DistanceUnit) -> String {
    let total = secs_per_unit.round().max(0.0) as u64;
    format!("{}:{:02}/{}", total / 60, total % 60, unit)
}

/// Parse a `M:SS`-shaped pace token (with or without a `/unit` suffix) into
/// seconds-per-unit. Bare numbers are rejected; a pace without a colon is
/// not a pace.
pub fn parse_pace_secs(s: &str) -> Option<u64> {
    let token = s.trim().split('/').next()?.trim();
    if !token.contains(':') {
        return None;
    }
    parse_clock(token)
}

/// Whether the whole string is a plain decimal number. Digits and at most
/// one dot only; `f64`'s wider grammar ("inf", "NaN", "1e3") is rejected.
pub fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.parse::<f64>().is_ok()
}

/// Leading numeric portion of a string like `"5.2 km"` or `"~8.0 km (est.)"`.
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches('~').trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
