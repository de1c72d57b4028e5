//! Rocket - Main Entry Point

use clap::Parser;
use rocket_cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    run(Cli::parse())
}
