//! Mitigation recommendations derived from raw readings
//!
//! Recommendations compare raw values against fixed trigger points, not
//! normalized impacts. A reading can score `critical` and still get only the
//! all-clear message.

use crate::sensors::{Dimension, SensorReading};
use serde::Serialize;

/// A single recommended action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Dimension that triggered it (None for the all-clear message)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    pub message: &'static str,
}

/// Dimension that dominates a reading, if a single one does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryFactor {
    Single(Dimension),
    Multiple,
}

impl std::fmt::Display for PrimaryFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryFactor::Single(dimension) => f.write_str(dimension.label()),
            PrimaryFactor::Multiple => f.write_str("Multiple Factors"),
        }
    }
}

pub const ALL_CLEAR: &str = "Conditions are within acceptable parameters";

/// Trigger rules, checked in order: (dimension, raw value above which it fires, message)
const TRIGGERS: &[(Dimension, f64, &str)] = &[
    (
        Dimension::Rainfall,
        40.0,
        "High rainfall detected - consider drainage improvements",
    ),
    (
        Dimension::SlopeAngle,
        45.0,
        "Steep slope angle - slope stabilization recommended",
    ),
    (
        Dimension::SoilMoisture,
        70.0,
        "High soil moisture - install water management systems",
    ),
    (
        Dimension::Vibration,
        10.0,
        "Excessive vibrations - implement vibration dampening",
    ),
];

fn is_triggered(reading: &SensorReading, dimension: Dimension, limit: f64) -> bool {
    reading.get(dimension) > limit
}

/// Recommended actions for a reading; never empty
pub fn recommendations(reading: &SensorReading) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = TRIGGERS
        .iter()
        .filter(|(dimension, limit, _)| is_triggered(reading, *dimension, *limit))
        .map(|(dimension, _, message)| Recommendation {
            dimension: Some(*dimension),
            message: *message,
        })
        .collect();

    if out.is_empty() {
        out.push(Recommendation {
            dimension: None,
            message: ALL_CLEAR,
        });
    }

    out
}

/// First of rainfall, slope angle, soil moisture past its trigger; otherwise `Multiple`
///
/// Vibration never counts as primary.
pub fn primary_factor(reading: &SensorReading) -> PrimaryFactor {
    TRIGGERS
        .iter()
        .filter(|(dimension, _, _)| *dimension != Dimension::Vibration)
        .find(|(dimension, limit, _)| is_triggered(reading, *dimension, *limit))
        .map(|(dimension, _, _)| PrimaryFactor::Single(*dimension))
        .unwrap_or(PrimaryFactor::Multiple)
}
