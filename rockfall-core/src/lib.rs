//! Rockfall core library - risk scoring for monitored slope and infrastructure sites

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Scoring is a pure function of one sensor reading
// - No global mutable state
// - No randomness, clocks, or IO inside the risk model
// - Report ordering is explicit and never depends on thread scheduling
// - Identical input yields byte-for-byte identical output

pub mod config;
pub mod recommend;
pub mod report;
pub mod risk;
pub mod sensors;
pub mod site;

pub use config::ResolvedConfig;
pub use report::{
    assess_sites, render_json, render_text, sort_reports, ReadingReport, SiteRiskReport,
};
pub use risk::{
    breakdown, classify, color_for, color_for_label, normalize, score, RiskAssessment,
    RiskFactorBreakdown, RiskLevel,
};
pub use sensors::{Dimension, SensorReading};
pub use site::{load_catalog, Alert, AlertFilter, Catalog, Site, SiteType};
