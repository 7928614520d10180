use anyhow::Result;
use clap::Parser;

use komodash::cli::{Cli, Commands};
use komodash::commands::{render, session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()))
        .init();

    match &cli.command {
        Commands::Render(args) => render::run(&cli, args),
        Commands::Session(args) => session::run(&cli, args),
    }
}
