//! Balance simulator CLI.
//!
//! Runs seeded Monte Carlo encounters against a config bundle.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                          # Demo bundle, 100 runs
//!   cargo run --bin simulate -- -n 10 -e 500 -s 42    # Reproducible run
//!   cargo run --bin simulate -- --config game.json --camp crypt --json

use anyhow::{Context, Result};
use clap::Parser;
use idle_engine::config::ConfigStore;
use idle_engine::simulator::{run_simulation, SimConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_BUNDLE: &str = include_str!("../../data/demo_config.json");

#[derive(Parser, Debug)]
#[command(name = "simulate", version, about = "Monte Carlo balance simulator")]
struct Args {
    /// Config bundle (JSON object of tables); defaults to the built-in demo
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of characters to simulate
    #[arg(short = 'n', long, default_value_t = 100)]
    runs: u32,

    /// Encounters per character
    #[arg(short, long, default_value_t = 200)]
    encounters: u32,

    /// RNG seed; each run uses seed + run index
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long, default_value = "human")]
    race: String,

    #[arg(long, default_value = "warrior")]
    class: String,

    #[arg(long, default_value = "meadow_burrows")]
    camp: String,

    /// Merchant to sell to when bags fill up
    #[arg(long, default_value = "trader_jolen")]
    merchant: String,

    /// Skip quest generation and turn-ins
    #[arg(long)]
    no_quests: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idle_engine=warn,simulate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let store = match &args.config {
        Some(path) => ConfigStore::from_path(path)
            .with_context(|| format!("loading config bundle {}", path.display()))?,
        None => ConfigStore::from_json_str(DEMO_BUNDLE).context("parsing built-in demo bundle")?,
    };

    let config = SimConfig {
        num_runs: args.runs,
        seed: args.seed,
        encounters: args.encounters,
        race_id: args.race,
        class_id: args.class,
        camp_id: args.camp,
        merchant_id: Some(args.merchant),
        simulate_quests: !args.no_quests,
        ..Default::default()
    };
    tracing::info!(
        runs = config.num_runs,
        encounters = config.encounters,
        seed = ?config.seed,
        "running simulation"
    );

    let report = run_simulation(&config, &store);
    if args.json {
        println!("{}", report.to_json());
    } else {
        println!("{}", report.to_text());
    }
    Ok(())
}
