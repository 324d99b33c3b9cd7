//! Village CLI: run the headless simulation.
//!
//! - `village run` - step the simulation for a number of frames and report
//! - `village config` - print the default configuration as YAML

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use bt_tools::TraceEvent;
use village::{EntityId, SimReport, Simulation, VillageConfig};

#[derive(Parser)]
#[command(name = "village")]
#[command(about = "Behaviour-tree village simulation", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation
    Run {
        /// YAML config file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames to simulate
        #[arg(long, default_value_t = 3000)]
        frames: u64,

        /// Seconds per frame
        #[arg(long, default_value_t = 0.02)]
        dt: f32,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Record node trace events for this agent id
        #[arg(long)]
        trace: Option<u64>,
    },

    /// Print the default config as YAML
    Config,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    report: &'a SimReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [TraceEvent]>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the --verbose default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            frames,
            dt,
            seed,
            json,
            trace,
        } => run(config, frames, dt, seed, json, trace.map(EntityId)),
        Commands::Config => {
            let yaml = VillageConfig::default()
                .to_yaml()
                .context("Failed to serialize default config")?;
            print!("{yaml}");
            Ok(())
        }
    }
}

fn run(
    config_path: Option<PathBuf>,
    frames: u64,
    dt: f32,
    seed: Option<u64>,
    json: bool,
    trace: Option<EntityId>,
) -> Result<()> {
    if !(dt.is_finite() && dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {dt}");
    }

    let mut config = VillageConfig::load_or_default(config_path.as_deref()).with_context(|| {
        match &config_path {
            Some(path) => format!("Failed to load config from {}", path.display()),
            None => "Invalid default config".to_string(),
        }
    })?;
    if let Some(seed) = seed {
        config.seed = seed;
    }

    tracing::info!(seed = config.seed, frames, dt, "Starting simulation");
    let mut sim = Simulation::new(config).context("Failed to set up simulation")?;
    if let Some(agent) = trace {
        sim.trace_agent(agent)
            .with_context(|| format!("Cannot trace agent {agent}"))?;
    }

    let report = sim.run(frames, dt);
    let events = trace
        .and_then(|agent| sim.trace_log(agent))
        .map(|log| log.events.as_slice());

    if json {
        let output = RunOutput {
            report: &report,
            trace: events,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report);
        if let Some(events) = events {
            println!();
            println!("Trace ({} events):", events.len());
            for event in events {
                println!(
                    "  {:>6}  {:<16} {}",
                    event.tick,
                    event.tag,
                    event.label.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn print_report(report: &SimReport) {
    println!("Village simulation");
    println!("==================");
    println!(
        "Frames:        {} ({:.1}s)",
        report.frames, report.elapsed_seconds
    );
    println!("Wood / stone:  {} / {}", report.wood, report.stone);
    println!("Harvests:      {}", report.harvests);
    println!(
        "Base:          {}/{}{}",
        report.base_health,
        report.base_max_health,
        if report.base_destroyed { " (destroyed)" } else { "" }
    );
    println!(
        "Villagers:     {} alive, {} spawned",
        report.villagers, report.villagers_spawned
    );
    println!(
        "Enemies:       {} alive, {} spawned, {} killed, {} reached the base",
        report.enemies_alive, report.enemies_spawned, report.enemies_killed, report.base_strikes
    );
    println!(
        "Towers:        {} standing, {} built",
        report.towers, report.towers_built
    );
    println!(
        "Waves:         {}",
        if report.waves_finished { "finished" } else { "in progress" }
    );
}
