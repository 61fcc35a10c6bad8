//! Conversions from catalog display text to canonical values.

use crate::domain::model::{DensityRange, UnitCode};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"));

static DENSITY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*-\s*(\d+)\s*kg/m³").expect("valid density range pattern")
});

/// Placeholders the catalog shows instead of a density.
const DENSITY_PLACEHOLDERS: [&str; 2] = ["Not applicable", "Unknown"];

/// `"42%"` becomes `0.42`, rounded to three decimals.
pub fn percentage_to_fraction(text: &str) -> Result<f64> {
    let number = text.trim().trim_end_matches('%').trim();
    let value: f64 = number
        .parse()
        .map_err(|_| EtlError::parse(text, "Could not convert percentage to number"))?;
    if !value.is_finite() {
        return Err(EtlError::parse(text, "Percentage is not a finite number"));
    }
    Ok(round_to_thousandths(value * 0.01))
}

fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Returns the only decimal number in `text`. Zero or several numbers are
/// rejected rather than guessed at.
pub fn extract_single_number(text: &str) -> Result<String> {
    let mut numbers = NUMBER.find_iter(text);
    match (numbers.next(), numbers.next()) {
        (Some(number), None) => Ok(number.as_str().to_string()),
        (Some(_), Some(_)) => Err(EtlError::parse(text, "Multiple numbers found in string")),
        (None, _) => Err(EtlError::parse(text, "No number found in string")),
    }
}

/// `"100 - 200 kg/m³"` gives both bounds; a single number is used for both.
pub fn extract_range(text: &str) -> Result<(String, String)> {
    if let Some(caps) = DENSITY_RANGE.captures(text) {
        return Ok((caps[1].to_string(), caps[2].to_string()));
    }
    let value = extract_single_number(text)?;
    Ok((value.clone(), value))
}

/// Density as shown in a component's properties, `None` for placeholders.
pub fn parse_density(text: &str) -> Result<Option<DensityRange>> {
    let text = text.trim();
    if text.is_empty() || DENSITY_PLACEHOLDERS.contains(&text) {
        return Ok(None);
    }
    let (min, max) = extract_range(text)?;
    Ok(Some(DensityRange { min, max }))
}

/// Checks are ordered: `m²` and `m³` must win over the bare `m`.
pub fn classify_functional_unit(text: &str) -> UnitCode {
    if text.contains("m²") || text.contains("m2") {
        UnitCode::Area
    } else if text.contains("m³") || text.contains("m3") {
        UnitCode::Volume
    } else if text.contains('m') {
        UnitCode::Length
    } else if text.contains("kg") {
        UnitCode::Mass
    } else if text.contains("piece") {
        UnitCode::Count
    } else if text.contains("kW") {
        UnitCode::Power
    } else {
        tracing::warn!("Unknown functional unit: {}", text);
        UnitCode::Other(text.to_string())
    }
}
