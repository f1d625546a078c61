use anyhow::Result;
use clap::{Parser, Subcommand};
use hspstream::api;
use hspstream::blastinput::simulate_args::SimulateArgs;

#[derive(Parser)]
#[command(name = "hspstream")]
#[command(version = "0.1.0")]
#[command(about = "Concurrent HSP result stream for BLAST-style searches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive synthetic search workers and a consumer through a stream
    Simulate(SimulateArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => {
            let summary = api::run(args)?;
            eprintln!(
                "lists written: {}  HSPs written: {}  lists read: {}  HSPs read: {}",
                summary.lists_written, summary.hsps_written, summary.lists_read, summary.hsps_read
            );
        }
    }
    Ok(())
}
