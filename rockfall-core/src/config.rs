//! Configuration file support for site reports
//!
//! Loads report filters from JSON files next to the site catalog.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.rockfallrc.json` in the catalog directory
//! 3. `rockfall.config.json` in the catalog directory
//!
//! All fields are optional. CLI flags take precedence over config file values.
//! The risk model's weights and thresholds are fixed and cannot be configured.

use crate::risk::RiskLevel;
use crate::site::{Site, SiteType};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Report configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RockfallConfig {
    /// Glob patterns over site ids to include (default: all sites)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns over site ids to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Risk levels to report (default: all levels)
    #[serde(default)]
    pub levels: Vec<RiskLevel>,

    /// Site types to report (default: all types)
    #[serde(default)]
    pub site_types: Vec<SiteType>,

    /// Minimum risk percentage to report (default: 0, report all)
    #[serde(default)]
    pub min_percentage: Option<u8>,

    /// Maximum number of sites to show
    #[serde(default)]
    pub top: Option<usize>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Levels to keep (empty means all)
    pub levels: Vec<RiskLevel>,
    /// Site types to keep (empty means all)
    pub site_types: Vec<SiteType>,
    /// Filters
    pub min_percentage: Option<u8>,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl RockfallConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(min) = self.min_percentage {
            if min > 100 {
                anyhow::bail!("min_percentage must be at most 100 (got {})", min);
            }
        }

        if self.top == Some(0) {
            anyhow::bail!("top must be at least 1");
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            Some(build_globset(&self.include)?)
        };
        let exclude = build_globset(&self.exclude)?;

        let mut levels = self.levels.clone();
        levels.sort();
        levels.dedup();

        let mut site_types = self.site_types.clone();
        site_types.sort();
        site_types.dedup();

        Ok(ResolvedConfig {
            include,
            exclude,
            levels,
            site_types,
            min_percentage: self.min_percentage,
            top_n: self.top,
            config_path: None,
        })
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

impl ResolvedConfig {
    /// Check if a site passes the id and type filters (level is checked after scoring)
    pub fn should_include(&self, site: &Site) -> bool {
        if self.exclude.is_match(&site.id) {
            return false;
        }

        if let Some(ref include) = self.include {
            if !include.is_match(&site.id) {
                return false;
            }
        }

        self.site_types.is_empty() || self.site_types.contains(&site.site_type)
    }

    /// Check if a scored site passes the level and percentage filters
    pub fn should_report(&self, level: RiskLevel, percentage: u8) -> bool {
        let level_match = self.levels.is_empty() || self.levels.contains(&level);
        let percentage_match = match self.min_percentage {
            Some(min) => percentage >= min,
            None => true,
        };
        level_match && percentage_match
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        RockfallConfig::default().resolve()
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.rockfallrc.json`
/// 2. `rockfall.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(RockfallConfig, PathBuf)>> {
    for name in [".rockfallrc.json", "rockfall.config.json"] {
        let path = dir.join(name);
        if path.exists() {
            tracing::debug!(path = %path.display(), "discovered config file");
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<RockfallConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: RockfallConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `search_dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(search_dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(search_dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (RockfallConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
