mod config;
mod engine;
mod errors;
mod manager;
mod model;
mod report;
mod stats;
mod sweep;

use crate::manager::Manager;
use crate::sweep::SweepOptions;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one simulation and write its event log and summary.
    Run,

    /// Run replicated simulations across vaccination rates.
    Sweep {
        #[arg(long, default_value_t = 11)]
        points: usize,

        #[arg(long, default_value_t = 10)]
        replicates: usize,
    },

    /// Remove generated run and sweep files.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Run => mgr.run_simulation()?,
        Command::Sweep { points, replicates } => mgr.run_sweep(&SweepOptions { points, replicates })?,
        Command::Clean => mgr.clean_sim()?,
    }

    Ok(())
}
