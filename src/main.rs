use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use log::{LevelFilter, debug, info};
use std::path::PathBuf;

use radio_propagation_estimator::config::EstimatorConfig;
use radio_propagation_estimator::propagation::clearance;
use radio_propagation_estimator::propagation::{Algorithm, Position, SpeedOfLight, units};
use radio_propagation_estimator::report::{self, HeightGridReport, SweepReport};
use radio_propagation_estimator::sweep;

#[derive(Parser, Debug)]
#[command(name = "propagation-estimator")]
#[command(version, about = "Free-space and two-ray ground received power estimator")]
struct Cli {
    /// TOML or JSON configuration file; defaults describe a 900 MHz, 50 W link.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Round printed dBm values to this precision (e.g. 0.01).
    #[arg(long, global = true)]
    precision: Option<f64>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Overrides {
    #[arg(long, global = true)]
    frequency_hz: Option<f64>,
    #[arg(long, global = true)]
    transmit_power_dbm: Option<f64>,
    /// free-space or two-ray-ground.
    #[arg(long, global = true)]
    algorithm: Option<Algorithm>,
    #[arg(long, global = true)]
    transmitter_height_m: Option<f64>,
    #[arg(long, global = true)]
    receiver_height_m: Option<f64>,
    /// Use c = 3e8 m/s instead of 299 792 458 m/s.
    #[arg(long, global = true)]
    legacy_speed_of_light: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Received power over a range of distances.
    Sweep {
        #[arg(long)]
        start: Option<f64>,
        #[arg(long)]
        end: Option<f64>,
        #[arg(long)]
        step: Option<f64>,
    },
    /// Two-ray received power over a grid of antenna heights.
    Heights {
        #[arg(long)]
        distance: Option<f64>,
    },
    /// Received power between two explicit positions.
    Point {
        /// Transmitter position as x,y,z in meters.
        #[arg(long, value_parser = parse_position)]
        tx: Position,
        /// Receiver position as x,y,z in meters.
        #[arg(long, value_parser = parse_position)]
        rx: Position,
    },
    /// Fresnel-zone antenna heights for the `[clearance]` link in the config.
    Clearance,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got '{}'", s));
    };
    let coord = |v: &str| v.parse::<f64>().map_err(|e| format!("invalid coordinate '{}': {}", v, e));
    Ok(Position::new(coord(*x)?, coord(*y)?, coord(*z)?))
}

fn apply_overrides(config: &mut EstimatorConfig, overrides: &Overrides) {
    if let Some(f) = overrides.frequency_hz {
        config.frequency_hz = f;
    }
    if let Some(p) = overrides.transmit_power_dbm {
        config.transmit_power_dbm = p;
    }
    if let Some(a) = overrides.algorithm {
        config.algorithm = a;
    }
    if let Some(h) = overrides.transmitter_height_m {
        config.transmitter_height_m = h;
    }
    if let Some(h) = overrides.receiver_height_m {
        config.receiver_height_m = h;
    }
    if overrides.legacy_speed_of_light {
        config.speed_of_light = SpeedOfLight::Legacy;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging setup; RUST_LOG still wins when set.
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("radio_propagation_estimator"), if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .filter(Some("propagation_estimator"), if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .init();

    let mut config = match &cli.config {
        Some(path) => EstimatorConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => EstimatorConfig::default(),
    };
    apply_overrides(&mut config, &cli.overrides);

    let output = match cli.command {
        Command::Sweep { start, end, step } => {
            if let Some(v) = start {
                config.sweep.start = v;
            }
            if let Some(v) = end {
                config.sweep.end = v;
            }
            if let Some(v) = step {
                config.sweep.step = v;
            }
            config.validate().context("Invalid configuration")?;
            let params = config.model_parameters()?;
            info!("Sweeping {}..{} m in {} m steps ({})", config.sweep.start, config.sweep.end, config.sweep.step, config.algorithm);
            let points = sweep::distance_sweep(&config.sweep, &config.link_setup(), &params, config.algorithm).context("Sweep aborted")?;
            let report = SweepReport::new(&points, &config);
            match cli.format {
                OutputFormat::Text => report.to_text(cli.precision)?,
                OutputFormat::Json => report.to_json()?,
            }
        }
        Command::Heights { distance } => {
            if let Some(d) = distance {
                config.height_grid.distance_m = d;
            }
            config.validate().context("Invalid configuration")?;
            let params = config.model_parameters()?;
            let points = sweep::height_grid(&config.height_grid, &config.link_setup(), &params).context("Height grid aborted")?;
            let report = HeightGridReport::new(points, &config);
            match cli.format {
                OutputFormat::Text => report.to_text(cli.precision)?,
                OutputFormat::Json => report.to_json()?,
            }
        }
        Command::Point { tx, rx } => {
            let result = config.received_power_between(tx, rx).context("Point query failed")?;
            debug!("{:?} -> {:?}: {:?}", tx, rx, result);
            match cli.format {
                OutputFormat::Text => match cli.precision {
                    Some(p) => format!("{} dBm\n", units::round_to_precision(result.received_power_dbm, p)?),
                    None => format!("{} dBm\n", result.received_power_dbm),
                },
                OutputFormat::Json => serde_json::to_string_pretty(&result)?,
            }
        }
        Command::Clearance => {
            let Some(link) = &config.clearance else {
                bail!("No [clearance] section in the configuration");
            };
            let plan = clearance::plan(link, config.speed_of_light).context("Clearance planning failed")?;
            match cli.format {
                OutputFormat::Text => report::clearance_text(&plan),
                OutputFormat::Json => serde_json::to_string_pretty(&plan)?,
            }
        }
    };

    print!("{}", output);
    Ok(())
}
