//! Command-line arguments for the search simulation

use std::path::PathBuf;

use clap::Args;

use super::blast_args::DEFAULT_NUM_THREADS;
use super::stream_args::StreamArgs;

/// Run synthetic producers and a consumer through an HSP stream
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 4)]
    pub queries: u32,
    #[arg(long, default_value_t = 100)]
    pub subjects: u32,
    #[arg(long, default_value_t = 3)]
    pub hsps_per_subject: usize,
    /// Seed for the synthetic scores
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_THREADS)]
    pub num_threads: usize,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
    #[command(flatten)]
    pub stream: StreamArgs,
}
