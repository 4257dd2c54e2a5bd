#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Hound Chase simulation.

mod chase;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::chase::Chase;

/// Headless hound chase: obstacles, traps and the hound boss.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the obstacle field and encounter streams.
    #[arg(long)]
    seed: Option<u64>,
    /// Host frames to simulate.
    #[arg(long, default_value_t = 2_400)]
    steps: u32,
    /// TOML file with `[field]`, `[encounter]` and `[runner]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Hound Chase command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = config::load(args.config.as_deref(), args.seed)?;
    log::debug!("chase configuration: {config:?}");
    let summary = Chase::new(config).run(args.steps);
    println!("{summary}");
    Ok(())
}
