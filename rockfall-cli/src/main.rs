//! Rockfall CLI - score rockfall risk for sensor readings and site catalogs

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rockfall_core::config;
use rockfall_core::report::{self, ReadingReport};
use rockfall_core::site::{AlertCounts, AlertFilter, AlertLevel, AlertStatus};
use rockfall_core::{assess_sites, load_catalog, render_json, render_text};
use rockfall_core::{Dimension, RiskLevel, SensorReading, SiteType};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "rockfall")]
#[command(about = "Rockfall risk scoring for monitored slopes, tunnels and road cuts")]
#[command(version = env!("ROCKFALL_VERSION"))]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single sensor reading
    Score {
        #[command(flatten)]
        reading: ReadingArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Score simulator parameters (unset parameters use simulator defaults)
    Simulate {
        #[command(flatten)]
        reading: SimulateArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Score every site in a catalog file
    Assess {
        /// Path to catalog JSON file
        catalog: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Show only top N sites (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Minimum risk percentage (overrides config file)
        #[arg(long)]
        min_percentage: Option<u8>,

        /// Only report these risk levels (repeatable, overrides config file)
        #[arg(long = "level")]
        levels: Vec<RiskLevel>,

        /// Only report these site types (repeatable, overrides config file)
        #[arg(long = "site-type")]
        site_types: Vec<SiteType>,

        /// Path to config file (default: auto-discover next to the catalog)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List alerts from a catalog file
    Alerts {
        /// Path to catalog JSON file
        catalog: PathBuf,

        /// Only show alerts with this status
        #[arg(long)]
        status: Option<AlertStatus>,

        /// Only show alerts with this level
        #[arg(long)]
        level: Option<AlertLevel>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Validate or show a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running an assessment
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

/// Sensor reading given entirely on the command line
#[derive(Args)]
struct ReadingArgs {
    /// Rainfall (mm)
    #[arg(long, allow_negative_numbers = true)]
    rainfall: f64,
    /// Slope angle (degrees)
    #[arg(long, allow_negative_numbers = true)]
    slope_angle: f64,
    /// Soil moisture (%)
    #[arg(long, allow_negative_numbers = true)]
    soil_moisture: f64,
    /// Vibration (Hz)
    #[arg(long, allow_negative_numbers = true)]
    vibration: f64,
    /// Temperature (°C)
    #[arg(long, allow_negative_numbers = true)]
    temperature: f64,
}

impl ReadingArgs {
    fn to_reading(&self) -> SensorReading {
        SensorReading::new(
            self.rainfall,
            self.slope_angle,
            self.soil_moisture,
            self.vibration,
            self.temperature,
        )
    }
}

/// Simulator parameters; each one falls back to its default
#[derive(Args)]
struct SimulateArgs {
    /// Rainfall (mm) [default: 25]
    #[arg(long, allow_negative_numbers = true)]
    rainfall: Option<f64>,
    /// Slope angle (degrees) [default: 30]
    #[arg(long, allow_negative_numbers = true)]
    slope_angle: Option<f64>,
    /// Soil moisture (%) [default: 50]
    #[arg(long, allow_negative_numbers = true)]
    soil_moisture: Option<f64>,
    /// Vibration (Hz) [default: 5]
    #[arg(long, allow_negative_numbers = true)]
    vibration: Option<f64>,
    /// Temperature (°C) [default: 25]
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f64>,
}

impl SimulateArgs {
    fn to_reading(&self) -> SensorReading {
        let mut reading = SensorReading::simulator_defaults();
        let overrides = [
            (Dimension::Rainfall, self.rainfall),
            (Dimension::SlopeAngle, self.slope_angle),
            (Dimension::SoilMoisture, self.soil_moisture),
            (Dimension::Vibration, self.vibration),
            (Dimension::Temperature, self.temperature),
        ];
        for (dimension, value) in overrides {
            if let Some(v) = value {
                reading.set(dimension, v);
            }
        }
        reading
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Install the stderr log subscriber; RUST_LOG wins over --verbose
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "rockfall=debug,rockfall_core=debug,warn"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Score { reading, format } => {
            let reading = reading.to_reading();
            reading.validate().context("invalid sensor reading")?;
            print_reading(ReadingReport::new(reading), format)?;
        }
        Commands::Simulate { reading, format } => {
            let reading = reading.to_reading();
            reading.validate().context("invalid simulation parameters")?;

            for dimension in reading.out_of_simulator_range() {
                let (min, max) = dimension.simulator_range();
                tracing::warn!(
                    parameter = dimension.as_str(),
                    value = reading.get(dimension),
                    "outside simulator range {}..={} {}, scoring as given",
                    min,
                    max,
                    dimension.unit()
                );
            }

            print_reading(ReadingReport::new(reading), format)?;
        }
        Commands::Assess {
            catalog,
            format,
            top,
            min_percentage,
            levels,
            site_types,
            config: config_path,
        } => {
            let catalog_path = normalize_path(&catalog)?;

            let search_dir = catalog_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| catalog_path.clone());
            let mut resolved_config = config::load_and_resolve(&search_dir, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved_config.config_path {
                tracing::info!(path = %config_path.display(), "using config");
            }

            // CLI flags override config file values
            if top.is_some() {
                resolved_config.top_n = top;
            }
            if let Some(min) = min_percentage {
                if min > 100 {
                    anyhow::bail!("--min-percentage must be at most 100 (got {})", min);
                }
                resolved_config.min_percentage = Some(min);
            }
            if !levels.is_empty() {
                resolved_config.levels = levels;
            }
            if !site_types.is_empty() {
                resolved_config.site_types = site_types;
            }

            let catalog = load_catalog(&catalog_path)?;
            let reports = assess_sites(&catalog, &resolved_config);

            match format {
                OutputFormat::Text => print!("{}", render_text(&reports)),
                OutputFormat::Json => println!("{}", render_json(&reports)),
            }
        }
        Commands::Alerts {
            catalog,
            status,
            level,
            format,
        } => {
            let catalog_path = normalize_path(&catalog)?;
            let catalog = load_catalog(&catalog_path)?;

            let filter = AlertFilter { status, level };
            let alerts = filter.apply(&catalog.alerts);
            let counts = AlertCounts::from_alerts(&catalog.alerts);

            match format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "alerts": alerts,
                        "counts": counts,
                    });
                    let rendered = serde_json::to_string_pretty(&json)
                        .context("failed to serialize alerts to JSON")?;
                    println!("{}", rendered);
                }
                OutputFormat::Text => print_alerts_text(&alerts, &counts),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let search_dir = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&search_dir, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let search_dir = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&search_dir, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Make a path absolute and check that it exists
fn normalize_path(path: &Path) -> anyhow::Result<PathBuf> {
    let normalized = if path.is_relative() {
        std::env::current_dir()?.join(path)
    } else {
        path.to_path_buf()
    };

    if !normalized.exists() {
        anyhow::bail!("Path does not exist: {}", normalized.display());
    }

    Ok(normalized)
}

fn print_reading(report: ReadingReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report::render_reading_text(&report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("failed to serialize assessment to JSON")?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Print alert table and status totals
fn print_alerts_text(alerts: &[&rockfall_core::Alert], counts: &AlertCounts) {
    println!("Alerts ({})", alerts.len());
    println!("{}", "=".repeat(80));

    if alerts.is_empty() {
        println!("No alerts match your current filters");
    }

    for alert in alerts {
        println!(
            "{:<10} {:<8} {:<13} {}",
            alert.id,
            alert.level.as_str().to_uppercase(),
            alert.status.as_str().to_uppercase(),
            alert.site_id
        );
        println!("   {}", alert.message);
        if let Some(ref action) = alert.action_taken {
            println!("   Action taken: {}", action);
        }
    }

    println!("{}", "-".repeat(80));
    println!(
        "Active: {}  Acknowledged: {}  Resolved: {}",
        counts.active, counts.acknowledged, counts.resolved
    );
}

fn print_config(resolved: &rockfall_core::ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Model (fixed):");
    for dimension in Dimension::ALL {
        let scale = rockfall_core::risk::reference_scale(dimension);
        let reference = match dimension {
            Dimension::Temperature => format!(
                "deviation of {} {} from {} {} (uncapped)",
                scale,
                dimension.unit(),
                rockfall_core::risk::TEMPERATURE_BASELINE_C,
                dimension.unit()
            ),
            _ => format!("{} {}", scale, dimension.unit()),
        };
        println!(
            "  {}: weight {:.2}, 100% impact at {}",
            dimension.as_str(),
            rockfall_core::risk::weight(dimension),
            reference
        );
    }
    println!(
        "  thresholds: moderate {}, high {}, critical {}",
        rockfall_core::risk::MODERATE_THRESHOLD,
        rockfall_core::risk::HIGH_THRESHOLD,
        rockfall_core::risk::CRITICAL_THRESHOLD
    );
    println!();
    println!("Filters:");
    println!(
        "  min_percentage: {}",
        resolved
            .min_percentage
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "  top: {}",
        resolved
            .top_n
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "  levels: {}",
        if resolved.levels.is_empty() {
            "all".to_string()
        } else {
            join_display(&resolved.levels)
        }
    );
    println!(
        "  site_types: {}",
        if resolved.site_types.is_empty() {
            "all".to_string()
        } else {
            join_display(&resolved.site_types)
        }
    );
    println!(
        "  include: {}",
        if resolved.include.is_some() {
            "custom patterns"
        } else {
            "all sites"
        }
    );
}

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
