//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::config::ResolvedConfig;
use crate::recommend::{self, PrimaryFactor, Recommendation};
use crate::risk::{self, RiskAssessment, RiskFactorBreakdown, RiskLevel};
use crate::sensors::SensorReading;
use crate::site::{Catalog, Site, SiteType};
use rayon::prelude::*;
use serde::Serialize;

/// Complete risk report for a site
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SiteRiskReport {
    pub id: String,
    pub name: String,
    pub site_type: SiteType,
    pub coordinates: [f64; 2],
    pub percentage: u8,
    pub level: RiskLevel,
    pub color: &'static str,
    pub factors: Vec<RiskFactorBreakdown>,
    pub active_alerts: usize,
}

impl SiteRiskReport {
    /// Score a site and assemble its report
    pub fn new(site: &Site, active_alerts: usize) -> Self {
        let (assessment, factors) = risk::analyze_risk(&site.sensors);
        SiteRiskReport {
            id: site.id.clone(),
            name: site.name.clone(),
            site_type: site.site_type,
            coordinates: site.coordinates,
            percentage: assessment.percentage,
            level: assessment.level,
            color: assessment.level.color(),
            factors: factors.to_vec(),
            active_alerts,
        }
    }
}

/// One-off assessment of a bare reading, as shown by the simulator
#[derive(Debug, Clone, Serialize)]
pub struct ReadingReport {
    pub reading: SensorReading,
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    pub color: &'static str,
    pub factors: Vec<RiskFactorBreakdown>,
    pub primary_factor: PrimaryFactor,
    pub recommendations: Vec<Recommendation>,
}

impl ReadingReport {
    pub fn new(reading: SensorReading) -> Self {
        let (assessment, factors) = risk::analyze_risk(&reading);
        ReadingReport {
            reading,
            assessment,
            color: assessment.level.color(),
            factors: factors.to_vec(),
            primary_factor: recommend::primary_factor(&reading),
            recommendations: recommend::recommendations(&reading),
        }
    }
}

/// Score every site that passes the config filters
///
/// Sites are scored in parallel; the result order comes from `sort_reports` only.
pub fn assess_sites(catalog: &Catalog, config: &ResolvedConfig) -> Vec<SiteRiskReport> {
    let reports: Vec<SiteRiskReport> = catalog
        .sites
        .par_iter()
        .filter(|site| config.should_include(site))
        .map(|site| SiteRiskReport::new(site, catalog.active_alert_count(&site.id)))
        .filter(|report| config.should_report(report.level, report.percentage))
        .collect();

    tracing::debug!(
        scored = reports.len(),
        total = catalog.sites.len(),
        "assessed sites"
    );

    let sorted = sort_reports(reports);
    match config.top_n {
        Some(top_n) => sorted.into_iter().take(top_n).collect(),
        None => sorted,
    }
}

/// Sort reports deterministically
pub fn sort_reports(mut reports: Vec<SiteRiskReport>) -> Vec<SiteRiskReport> {
    reports.sort_by(|a, b| {
        // 1. Percentage descending
        b.percentage
            .cmp(&a.percentage)
            // 2. Site id ascending
            .then_with(|| a.id.cmp(&b.id))
    });
    reports
}

/// Site counts per risk level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub safe: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,
}

impl LevelCounts {
    pub fn from_reports(reports: &[SiteRiskReport]) -> Self {
        let mut counts = LevelCounts::default();
        for report in reports {
            match report.level {
                RiskLevel::Safe => counts.safe += 1,
                RiskLevel::Moderate => counts.moderate += 1,
                RiskLevel::High => counts.high += 1,
                RiskLevel::Critical => counts.critical += 1,
            }
        }
        counts
    }
}

/// Render site reports as text output
pub fn render_text(reports: &[SiteRiskReport]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<6} {:<10} {:<16} {:<24} {:<8} {}\n",
        "RISK", "LEVEL", "TYPE", "SITE", "ALERTS", "NAME"
    ));

    for report in reports {
        output.push_str(&format!(
            "{:<6} {:<10} {:<16} {:<24} {:<8} {}\n",
            format!("{}%", report.percentage),
            report.level.as_str(),
            report.site_type.as_str(),
            truncate_or_pad(&report.id, 24),
            report.active_alerts,
            report.name,
        ));
    }

    let counts = LevelCounts::from_reports(reports);
    output.push_str(&format!(
        "\n{} sites  |  Critical: {}  High: {}  Moderate: {}  Safe: {}\n",
        reports.len(),
        counts.critical,
        counts.high,
        counts.moderate,
        counts.safe
    ));

    output
}

/// Render a single reading assessment as text
pub fn render_reading_text(report: &ReadingReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Risk: {}% [{}] ({})\n",
        report.assessment.percentage,
        report.assessment.level.as_str().to_uppercase(),
        report.assessment.level.color_name()
    ));
    output.push_str("Risk Breakdown:\n");
    for factor in &report.factors {
        output.push_str(&format!(
            "  • {:<14} {:>8.1} {:<3} impact {:>5.0}%  (weight {:.0}%)\n",
            factor.name,
            factor.value,
            factor.dimension.unit(),
            factor.normalized_impact,
            factor.weight * 100.0
        ));
    }
    output.push_str(&format!("Primary Factor: {}\n", report.primary_factor));
    output.push_str("Recommendations:\n");
    for rec in &report.recommendations {
        output.push_str(&format!("  - {}\n", rec.message));
    }

    output
}

/// Render site reports as JSON output
pub fn render_json(reports: &[SiteRiskReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
