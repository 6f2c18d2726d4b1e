//! Rockfall risk model
//!
//! Global invariants enforced:
//! - Deterministic risk calculations
//! - Weights are fixed and sum to 1.0
//! - Percentage is always in [0, 100]
//! - Level classification is monotonic in percentage
//!
//! Transforms (impact on a 0-100 scale):
//! - rainfall      = min(rainfall / 50 * 100, 100)
//! - slope_angle   = min(slope_angle / 45 * 100, 100)
//! - soil_moisture = min(soil_moisture / 80 * 100, 100)
//! - vibration     = min(vibration / 10 * 100, 100)
//! - temperature   = |temperature - 25| / 15 * 100   (not clamped)
//!
//! Score:
//! percentage = round(min(0.30 R + 0.25 S + 0.20 M + 0.15 V + 0.10 T, 100))

use crate::sensors::{Dimension, SensorReading};
use serde::{Deserialize, Serialize};

/// Baseline temperature in °C; impact grows with distance from it in either direction
pub const TEMPERATURE_BASELINE_C: f64 = 25.0;

/// Color returned for level labels that are not recognized
pub const NEUTRAL_COLOR: &str = "#64748b";

/// Lower edge (inclusive) of each tier above `Safe`
pub const MODERATE_THRESHOLD: u8 = 25;
pub const HIGH_THRESHOLD: u8 = 50;
pub const CRITICAL_THRESHOLD: u8 = 75;

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,     // < 25
    Moderate, // 25-50
    High,     // 50-75
    Critical, // >= 75
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Safe,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Presentation color token (hex)
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "#10b981",
            RiskLevel::Moderate => "#f59e0b",
            RiskLevel::High => "#f97316",
            RiskLevel::Critical => "#ef4444",
        }
    }

    /// Plain color name for terminals and logs
    pub fn color_name(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "green",
            RiskLevel::Moderate => "amber",
            RiskLevel::High => "orange",
            RiskLevel::Critical => "red",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(RiskLevel::Safe),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => anyhow::bail!(
                "unknown risk level '{}' (expected safe, moderate, high or critical)",
                other
            ),
        }
    }
}

/// Result of scoring one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub percentage: u8,
    pub level: RiskLevel,
}

/// Per-dimension contribution to the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFactorBreakdown {
    pub dimension: Dimension,
    pub name: &'static str,
    /// Raw reading the impact was derived from
    pub value: f64,
    pub normalized_impact: f64,
    pub weight: f64,
}

impl RiskFactorBreakdown {
    /// Weighted share of the overall percentage
    pub fn contribution(&self) -> f64 {
        self.normalized_impact * self.weight
    }
}

/// Fixed contribution weight of a dimension
pub fn weight(dimension: Dimension) -> f64 {
    match dimension {
        Dimension::Rainfall => 0.30,
        Dimension::SlopeAngle => 0.25,
        Dimension::SoilMoisture => 0.20,
        Dimension::Vibration => 0.15,
        Dimension::Temperature => 0.10,
    }
}

/// Raw value treated as full saturation (temperature: deviation span)
pub fn reference_scale(dimension: Dimension) -> f64 {
    match dimension {
        Dimension::Rainfall => 50.0,
        Dimension::SlopeAngle => 45.0,
        Dimension::SoilMoisture => 80.0,
        Dimension::Vibration => 10.0,
        Dimension::Temperature => 15.0,
    }
}

/// Map a raw reading onto the 0-100 impact scale of its dimension
///
/// Temperature is the only dimension without an upper clamp here, so an
/// extreme temperature can exceed its nominal share before the final cap.
pub fn normalize(dimension: Dimension, raw: f64) -> f64 {
    let scale = reference_scale(dimension);
    match dimension {
        Dimension::Temperature => (raw - TEMPERATURE_BASELINE_C).abs() / scale * 100.0,
        _ => (raw / scale * 100.0).min(100.0),
    }
}

/// Normalized impact and weight for every dimension, in descending weight order
pub fn breakdown(reading: &SensorReading) -> [RiskFactorBreakdown; 5] {
    Dimension::ALL.map(|dimension| {
        let value = reading.get(dimension);
        RiskFactorBreakdown {
            dimension,
            name: dimension.label(),
            value,
            normalized_impact: normalize(dimension, value),
            weight: weight(dimension),
        }
    })
}

/// Weighted sum of factor impacts, before capping and rounding
pub fn weighted_sum(factors: &[RiskFactorBreakdown]) -> f64 {
    factors.iter().map(RiskFactorBreakdown::contribution).sum()
}

/// Cap at 100 and round to the nearest integer
///
/// Negative raw readings can pull the sum below zero; those floor at 0.
pub fn to_percentage(sum: f64) -> u8 {
    sum.min(100.0).round().max(0.0) as u8
}

/// Assign risk level from a percentage
pub fn classify(percentage: u8) -> RiskLevel {
    if percentage >= CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if percentage >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if percentage >= MODERATE_THRESHOLD {
        RiskLevel::Moderate
    } else {
        RiskLevel::Safe
    }
}

/// Score a reading
pub fn score(reading: &SensorReading) -> RiskAssessment {
    analyze_risk(reading).0
}

/// Score a reading and keep the factor breakdown it was derived from
pub fn analyze_risk(reading: &SensorReading) -> (RiskAssessment, [RiskFactorBreakdown; 5]) {
    let factors = breakdown(reading);
    let percentage = to_percentage(weighted_sum(&factors));
    let assessment = RiskAssessment {
        percentage,
        level: classify(percentage),
    };
    (assessment, factors)
}

pub fn color_for(level: RiskLevel) -> &'static str {
    level.color()
}

/// Color for a level given by name, falling back to [`NEUTRAL_COLOR`]
pub fn color_for_label(label: &str) -> &'static str {
    label
        .parse::<RiskLevel>()
        .map(|level| level.color())
        .unwrap_or(NEUTRAL_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(r: f64, s: f64, m: f64, v: f64, t: f64) -> SensorReading {
        SensorReading::new(r, s, m, v, t)
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = Dimension::ALL.iter().map(|d| weight(*d)).sum();
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_normalize_clamps_all_but_temperature() {
        assert_eq!(normalize(Dimension::Rainfall, 25.0), 50.0);
        assert_eq!(normalize(Dimension::Rainfall, 500.0), 100.0);
        assert_eq!(normalize(Dimension::SlopeAngle, 90.0), 100.0);
        assert_eq!(normalize(Dimension::SoilMoisture, 40.0), 50.0);
        assert_eq!(normalize(Dimension::SoilMoisture, 100.0), 100.0);
        assert_eq!(normalize(Dimension::Vibration, 5.0), 50.0);
        assert_eq!(normalize(Dimension::Vibration, 20.0), 100.0);
        assert_eq!(normalize(Dimension::Temperature, 100.0), 500.0);
    }

    #[test]
    fn test_temperature_deviation_is_symmetric() {
        assert_eq!(normalize(Dimension::Temperature, 25.0), 0.0);
        assert_eq!(
            normalize(Dimension::Temperature, 10.0),
            normalize(Dimension::Temperature, 40.0)
        );
        assert_eq!(normalize(Dimension::Temperature, 40.0), 100.0);
    }

    #[test]
    fn test_negative_inputs_normalize_below_zero() {
        assert!(normalize(Dimension::Rainfall, -10.0) < 0.0);
        let assessment = score(&reading(-100.0, -100.0, -100.0, -100.0, 25.0));
        assert_eq!(assessment.percentage, 0);
        assert_eq!(assessment.level, RiskLevel::Safe);
    }

    #[test]
    fn test_calm_reading_is_safe() {
        let assessment = score(&reading(0.0, 0.0, 0.0, 0.0, 25.0));
        assert_eq!(assessment.percentage, 0);
        assert_eq!(assessment.level, RiskLevel::Safe);
    }

    #[test]
    fn test_saturated_reading_at_baseline_temperature() {
        // Four dimensions saturated, temperature contributes nothing at 25 °C
        let assessment = score(&reading(50.0, 45.0, 80.0, 10.0, 25.0));
        assert_eq!(assessment.percentage, 90);
        assert_eq!(assessment.level, RiskLevel::Critical);
    }

    #[test]
    fn test_fully_saturated_reading() {
        let assessment = score(&reading(50.0, 45.0, 80.0, 10.0, 40.0));
        assert_eq!(assessment.percentage, 100);
        assert_eq!(assessment.level, RiskLevel::Critical);
    }

    #[test]
    fn test_tunnel_exit_sample_is_critical() {
        let assessment = score(&reading(45.3, 42.0, 78.5, 8.2, 22.5));
        assert_eq!(assessment.percentage, 84);
        assert_eq!(assessment.level, RiskLevel::Critical);
    }

    #[test]
    fn test_ridge_line_sample_is_moderate() {
        let assessment = score(&reading(12.7, 28.5, 45.2, 3.1, 24.1));
        assert_eq!(assessment.percentage, 40);
        assert_eq!(assessment.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_extreme_temperature_hits_cap() {
        let assessment = score(&reading(0.0, 0.0, 0.0, 0.0, -200.0));
        assert_eq!(assessment.percentage, 100);
        assert_eq!(assessment.level, RiskLevel::Critical);
    }

    #[test]
    fn test_classify_threshold_edges() {
        assert_eq!(classify(0), RiskLevel::Safe);
        assert_eq!(classify(24), RiskLevel::Safe);
        assert_eq!(classify(25), RiskLevel::Moderate);
        assert_eq!(classify(49), RiskLevel::Moderate);
        assert_eq!(classify(50), RiskLevel::High);
        assert_eq!(classify(74), RiskLevel::High);
        assert_eq!(classify(75), RiskLevel::Critical);
        assert_eq!(classify(100), RiskLevel::Critical);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut previous = classify(0);
        for p in 1..=100u8 {
            let current = classify(p);
            assert!(current >= previous, "level dropped at {}", p);
            previous = current;
        }
    }

    #[test]
    fn test_to_percentage_rounds_half_up() {
        assert_eq!(to_percentage(24.5), 25);
        assert_eq!(to_percentage(24.49), 24);
        assert_eq!(to_percentage(150.0), 100);
        assert_eq!(to_percentage(-3.0), 0);
    }

    #[test]
    fn test_breakdown_order_and_weights() {
        let factors = breakdown(&reading(25.0, 30.0, 50.0, 5.0, 25.0));
        let names: Vec<&str> = factors.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["Rainfall", "Slope Angle", "Soil Moisture", "Vibration", "Temperature"]
        );
        assert_eq!(factors[0].normalized_impact, 50.0);
        assert_eq!(factors[0].value, 25.0);
        assert_eq!(factors[4].normalized_impact, 0.0);
        assert!(factors.windows(2).all(|w| w[0].weight > w[1].weight));
    }

    #[test]
    fn test_breakdown_matches_score() {
        let r = reading(32.1, 38.2, 62.3, 5.7, 23.8);
        let (assessment, factors) = analyze_risk(&r);
        let sum = weighted_sum(&factors).min(100.0);
        assert!((sum - assessment.percentage as f64).abs() <= 1.0);
        assert_eq!(assessment, score(&r));
    }

    #[test]
    fn test_colors_are_distinct() {
        let critical = color_for(RiskLevel::Critical);
        for level in [RiskLevel::Safe, RiskLevel::Moderate, RiskLevel::High] {
            assert_ne!(critical, color_for(level));
        }
        assert_eq!(critical, "#ef4444");
    }

    #[test]
    fn test_color_for_label_falls_back_to_neutral() {
        assert_eq!(color_for_label("safe"), "#10b981");
        assert_eq!(color_for_label("CRITICAL"), "#ef4444");
        assert_eq!(color_for_label("unknown"), NEUTRAL_COLOR);
        assert_eq!(color_for_label(""), NEUTRAL_COLOR);
    }

    #[test]
    fn test_level_parse_roundtrip() {
        for level in RiskLevel::ALL {
            assert_eq!(level.as_str().parse::<RiskLevel>().unwrap(), level);
        }
        assert!("extreme".parse::<RiskLevel>().is_err());
    }
}
