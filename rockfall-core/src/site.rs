//! Monitored sites, their alerts, and the catalog file that lists them
//!
//! Risk level and percentage are never stored on a site; they are derived
//! from its sensor reading each time a report is built.

use crate::sensors::SensorReading;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Kind of infrastructure being monitored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteType {
    Tunnel,
    Slope,
    RoadCut,
    Bridge,
    RetainingWall,
}

impl SiteType {
    pub const ALL: [SiteType; 5] = [
        SiteType::Tunnel,
        SiteType::Slope,
        SiteType::RoadCut,
        SiteType::Bridge,
        SiteType::RetainingWall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteType::Tunnel => "tunnel",
            SiteType::Slope => "slope",
            SiteType::RoadCut => "road-cut",
            SiteType::Bridge => "bridge",
            SiteType::RetainingWall => "retaining-wall",
        }
    }
}

impl std::fmt::Display for SiteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SiteType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SiteType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown site type '{}'", s))
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }
}

impl std::str::FromStr for AlertLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(AlertLevel::Info),
            "warning" => Ok(AlertLevel::Warning),
            "critical" => Ok(AlertLevel::Critical),
            other => anyhow::bail!("unknown alert level '{}'", other),
        }
    }
}

/// Where an alert sits in its handling lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 3] = [
        AlertStatus::Active,
        AlertStatus::Acknowledged,
        AlertStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            other => anyhow::bail!("unknown alert status '{}'", other),
        }
    }
}

/// An alert raised against a site. Opaque to the risk model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alert {
    pub id: String,
    pub site_id: String,
    pub level: AlertLevel,
    pub message: String,
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
}

/// A monitored site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub site_type: SiteType,
    /// Latitude, longitude
    pub coordinates: [f64; 2],
    pub sensors: SensorReading,
}

/// Everything loaded from a catalog file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl Catalog {
    /// Check readings are finite, site ids are unique, and alerts point at known sites
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for site in &self.sites {
            if site.id.trim().is_empty() {
                anyhow::bail!("site '{}' has an empty id", site.name);
            }
            if !ids.insert(site.id.as_str()) {
                anyhow::bail!("duplicate site id: {}", site.id);
            }
            site.sensors
                .validate()
                .with_context(|| format!("invalid sensor reading for site {}", site.id))?;
        }

        for alert in &self.alerts {
            if !ids.contains(alert.site_id.as_str()) {
                anyhow::bail!(
                    "alert {} refers to unknown site {}",
                    alert.id,
                    alert.site_id
                );
            }
        }

        Ok(())
    }

    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    /// Alerts raised against one site, in catalog order
    pub fn alerts_for<'a>(&'a self, site_id: &'a str) -> impl Iterator<Item = &'a Alert> + 'a {
        self.alerts.iter().filter(move |a| a.site_id == site_id)
    }

    /// Number of active alerts for a site
    pub fn active_alert_count(&self, site_id: &str) -> usize {
        self.alerts_for(site_id)
            .filter(|a| a.status == AlertStatus::Active)
            .count()
    }
}

/// Load and validate a catalog from a JSON file
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    let catalog: Catalog = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalog file: {}", path.display()))?;

    catalog
        .validate()
        .with_context(|| format!("invalid catalog in: {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        sites = catalog.sites.len(),
        alerts = catalog.alerts.len(),
        "loaded catalog"
    );

    Ok(catalog)
}

/// Alert table filter; `None` means "all"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub level: Option<AlertLevel>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        let status_match = self.status.is_none() || self.status == Some(alert.status);
        let level_match = self.level.is_none() || self.level == Some(alert.level);
        status_match && level_match
    }

    pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        alerts.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Alert totals per lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub active: usize,
    pub acknowledged: usize,
    pub resolved: usize,
}

impl AlertCounts {
    pub fn from_alerts<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        let mut counts = AlertCounts::default();
        for alert in alerts {
            match alert.status {
                AlertStatus::Active => counts.active += 1,
                AlertStatus::Acknowledged => counts.acknowledged += 1,
                AlertStatus::Resolved => counts.resolved += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.active + self.acknowledged + self.resolved
    }
}
