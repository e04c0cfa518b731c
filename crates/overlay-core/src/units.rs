//! Millimetre -> inch conversion for dimension callouts
//!
//! Drawings in this domain are dimensioned in millimetres, so a bare number is
//! taken as millimetres. Thickness notations (`t4.5`), radius/diameter marks
//! and multi-axis compounds (`105x155x4.5`) are not convertible and yield `None`.

use lazy_static::lazy_static;
use regex::Regex;

pub const MM_PER_INCH: f64 = 25.4;

lazy_static! {
    /// Leading magnitude with an optional millimetre suffix and nothing else
    static ref MILLIMETER_PATTERN: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d*)?|\.\d+)\s*(?i:mm)?\s*$").unwrap();

    /// Multi-axis separators
    static ref COMPOUND_PATTERN: Regex = Regex::new(r"[xX×]").unwrap();
}

/// Millimetre magnitude of a dimension string, if it is a plain length
pub fn parse_millimeters(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let first = trimmed.chars().next()?;

    // Prefix markers such as thickness (t), radius (R) or diameter (φ)
    if !(first.is_ascii_digit() || first == '.') {
        return None;
    }
    if COMPOUND_PATTERN.is_match(trimmed) {
        return None;
    }

    let captures = MILLIMETER_PATTERN.captures(trimmed)?;
    captures
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|mm| mm.is_finite())
}

pub fn mm_to_inches(millimeters: f64) -> f64 {
    millimeters / MM_PER_INCH
}

/// Inch display string for a dimension value, e.g. `"100"` -> `3.94"`
pub fn convert_dimension(raw: &str) -> Option<String> {
    parse_millimeters(raw).map(|mm| format!("{:.2}\"", mm_to_inches(mm)))
}
