//! Coordinate extraction from pasted map links and raw "lat, lng" text.

use regex::Regex;
use std::sync::LazyLock;

use crate::errors::AppError;
use crate::models::LocationPoint;

/// `@<lat>,<lng>` as found in shared map URLs.
static MAP_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(-?[0-9]+(?:\.[0-9]+)?),(-?[0-9]+(?:\.[0-9]+)?)")
        .expect("map link pattern is valid")
});

/// `<lat>, <lng>` anywhere in the text.
static BARE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?[0-9]+(?:\.[0-9]+)?),\s*(-?[0-9]+(?:\.[0-9]+)?)")
        .expect("bare pair pattern is valid")
});

/// Resolves free text into a single map pin.
///
/// The map-link pattern is tried first and the bare pair second; the first
/// pattern that matches decides the result, using its leftmost match.
pub fn resolve(text: &str) -> Result<LocationPoint, AppError> {
    for pattern in [&*MAP_LINK, &*BARE_PAIR] {
        if let Some(caps) = pattern.captures(text) {
            let latitude = parse_coordinate(&caps[1])?;
            let longitude = parse_coordinate(&caps[2])?;
            return validate(LocationPoint {
                latitude,
                longitude,
            });
        }
    }

    tracing::debug!("No coordinates found in {} chars of text", text.len());
    Err(AppError::ExtractionFailed(
        "no map link or latitude/longitude pair in the text".to_string(),
    ))
}

fn parse_coordinate(raw: &str) -> Result<f64, AppError> {
    raw.parse::<f64>()
        .map_err(|e| AppError::ExtractionFailed(format!("invalid coordinate '{}': {}", raw, e)))
}

fn validate(point: LocationPoint) -> Result<LocationPoint, AppError> {
    if !(-90.0..=90.0).contains(&point.latitude) {
        return Err(AppError::ExtractionFailed(format!(
            "latitude {} is outside [-90, 90]",
            point.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&point.longitude) {
        return Err(AppError::ExtractionFailed(format!(
            "longitude {} is outside [-180, 180]",
            point.longitude
        )));
    }
    Ok(point)
}
