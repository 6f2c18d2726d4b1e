//! Sensor readings and the five dimensions they are measured along
//!
//! Global invariants enforced:
//! - Dimension order is fixed (descending weight)
//! - Readings are plain values; nothing here clamps or rewrites input

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One sensor dimension of a monitored site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Rainfall,
    SlopeAngle,
    SoilMoisture,
    Vibration,
    Temperature,
}

impl Dimension {
    /// All dimensions, ordered by descending weight
    pub const ALL: [Dimension; 5] = [
        Dimension::Rainfall,
        Dimension::SlopeAngle,
        Dimension::SoilMoisture,
        Dimension::Vibration,
        Dimension::Temperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Rainfall => "rainfall",
            Dimension::SlopeAngle => "slope_angle",
            Dimension::SoilMoisture => "soil_moisture",
            Dimension::Vibration => "vibration",
            Dimension::Temperature => "temperature",
        }
    }

    /// Human-readable label used in breakdown displays
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Rainfall => "Rainfall",
            Dimension::SlopeAngle => "Slope Angle",
            Dimension::SoilMoisture => "Soil Moisture",
            Dimension::Vibration => "Vibration",
            Dimension::Temperature => "Temperature",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Dimension::Rainfall => "mm",
            Dimension::SlopeAngle => "°",
            Dimension::SoilMoisture => "%",
            Dimension::Vibration => "Hz",
            Dimension::Temperature => "°C",
        }
    }

    /// Slider bounds offered by the parameter simulator `(min, max)`
    pub fn simulator_range(&self) -> (f64, f64) {
        match self {
            Dimension::Rainfall => (0.0, 100.0),
            Dimension::SlopeAngle => (0.0, 60.0),
            Dimension::SoilMoisture => (0.0, 100.0),
            Dimension::Vibration => (0.0, 20.0),
            Dimension::Temperature => (-10.0, 50.0),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw readings for one site at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorReading {
    /// Rainfall in mm
    pub rainfall: f64,
    /// Slope angle in degrees
    #[serde(alias = "slopeAngle")]
    pub slope_angle: f64,
    /// Soil moisture in percent (not clamped)
    #[serde(alias = "soilMoisture")]
    pub soil_moisture: f64,
    /// Vibration in Hz
    pub vibration: f64,
    /// Temperature in °C
    pub temperature: f64,
}

impl SensorReading {
    pub fn new(
        rainfall: f64,
        slope_angle: f64,
        soil_moisture: f64,
        vibration: f64,
        temperature: f64,
    ) -> Self {
        SensorReading {
            rainfall,
            slope_angle,
            soil_moisture,
            vibration,
            temperature,
        }
    }

    /// Starting parameters of the simulator view
    pub fn simulator_defaults() -> Self {
        SensorReading::new(25.0, 30.0, 50.0, 5.0, 25.0)
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Rainfall => self.rainfall,
            Dimension::SlopeAngle => self.slope_angle,
            Dimension::SoilMoisture => self.soil_moisture,
            Dimension::Vibration => self.vibration,
            Dimension::Temperature => self.temperature,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Rainfall => self.rainfall = value,
            Dimension::SlopeAngle => self.slope_angle = value,
            Dimension::SoilMoisture => self.soil_moisture = value,
            Dimension::Vibration => self.vibration = value,
            Dimension::Temperature => self.temperature = value,
        }
    }

    /// Reject NaN and infinite fields before they reach the model
    pub fn validate(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            let value = self.get(dimension);
            if !value.is_finite() {
                anyhow::bail!("{} must be a finite number (got {})", dimension.as_str(), value);
            }
        }
        Ok(())
    }

    /// Dimensions whose value lies outside the simulator slider bounds
    pub fn out_of_simulator_range(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| {
                let (min, max) = d.simulator_range();
                let value = self.get(*d);
                value < min || value > max
            })
            .collect()
    }
}
