// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! afrcalc: annual data-loss probability calculator for replicated and
//! erasure-coded clusters.

use std::path::Path;

use afrcalc_core::{Config, LogFormat, LoggingConfig};
use afrcalc_model::{cluster_afr, cluster_afr_fullmesh, estimate};
use afrcalc_sim::BruteForceSimulator;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod report;

use cli::{ClusterArgs, Cli, Commands, OutputFormat};
use report::{ComparisonReport, EstimateReport, FullmeshReport, SimulationReport};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Estimate(args) => run_estimate(args),
        Commands::Fullmesh(args) => run_fullmesh(args),
        Commands::Simulate(args) => run_simulate(args),
        Commands::Compare(args) => run_compare(args),
        Commands::Version => {
            println!("afrcalc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_estimate(args: cli::EstimateArgs) -> Result<()> {
    let config = load_config(&args.cluster)?;
    init_logging(&config.logging)?;

    let estimate = estimate(&config.cluster).context("Analytic estimate failed")?;
    let report = EstimateReport { cluster: &config.cluster, estimate: &estimate };

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => report::print_estimate(&report, args.explain),
    }
    Ok(())
}

fn run_fullmesh(args: cli::FullmeshArgs) -> Result<()> {
    init_logging(&LoggingConfig::default())?;

    let afr = args.afr / 100.0;
    let probability = cluster_afr_fullmesh(args.drives, afr, args.days, args.replicas)
        .context("Full-mesh estimate failed")?;
    let report = FullmeshReport {
        drives: args.drives,
        afr,
        days: args.days,
        replicas: args.replicas,
        probability,
    };

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => report::print_fullmesh(&report),
    }
    Ok(())
}

fn run_simulate(args: cli::SimulateArgs) -> Result<()> {
    let mut config = load_config(&args.cluster)?;
    args.apply(&mut config.simulation);
    init_logging(&config.logging)?;

    let seed = resolve_seed(config.simulation.seed);
    let simulator = BruteForceSimulator::new(&config.cluster)
        .context("Invalid simulation parameters")?
        .with_max_retries(config.simulation.max_retries);
    let summary = simulator
        .run_many(config.simulation.runs, seed)
        .context("Simulation failed")?;

    let report = SimulationReport {
        cluster: &config.cluster,
        seed,
        groups: simulator.group_count(),
        summary,
    };

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => report::print_simulation(&report),
    }
    Ok(())
}

fn run_compare(args: cli::SimulateArgs) -> Result<()> {
    let mut config = load_config(&args.cluster)?;
    args.apply(&mut config.simulation);
    init_logging(&config.logging)?;

    let analytic = cluster_afr(&config.cluster).context("Analytic estimate failed")?;

    let seed = resolve_seed(config.simulation.seed);
    let summary = BruteForceSimulator::new(&config.cluster)
        .context("Invalid simulation parameters")?
        .with_max_retries(config.simulation.max_retries)
        .run_many(config.simulation.runs, seed)
        .context("Simulation failed")?;

    let report = ComparisonReport::new(&config.cluster, seed, analytic, summary);
    info!(
        analytic,
        simulated = summary.mean,
        relative_difference = report.relative_difference,
        "Compared estimators"
    );

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => report::print_comparison(&report),
    }
    Ok(())
}

/// Load the configuration file, if any, and apply the command line flags.
fn load_config(args: &ClusterArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => Config::default(),
    };
    args.apply(&mut config.cluster);
    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    Config::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed: u64 = rand::random();
        debug!(seed, "No seed configured, picked one");
        seed
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry().with(filter).with(fmt_layer.json()).init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
    }

    Ok(())
}
