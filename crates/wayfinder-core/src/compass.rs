//! 16-point compass rose

use crate::edge::normalize_angle;

/// Point names clockwise from North
pub const COMPASS_POINTS: [&str; 16] = [
    "North",
    "North-Northeast",
    "Northeast",
    "East-Northeast",
    "East",
    "East-Southeast",
    "Southeast",
    "South-Southeast",
    "South",
    "South-Southwest",
    "Southwest",
    "West-Southwest",
    "West",
    "West-Northwest",
    "Northwest",
    "North-Northwest",
];

/// Abbreviations in the same order
pub const COMPASS_ABBREVIATIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR: f64 = 360.0 / 16.0;

/// Sector index for a heading, each sector centered on its point
pub fn compass_index(angle: f64) -> usize {
    let angle = normalize_angle(angle);
    ((angle + SECTOR / 2.0) / SECTOR).floor() as usize % 16
}

/// Full point name for a heading
pub fn compass_word(angle: f64) -> &'static str {
    COMPASS_POINTS[compass_index(angle)]
}

/// Abbreviated point name for a heading
pub fn compass_abbreviation(angle: f64) -> &'static str {
    COMPASS_ABBREVIATIONS[compass_index(angle)]
}
