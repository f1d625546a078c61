//! Stream selection arguments

use std::time::Duration;

use clap::Args;

use super::blast_args::{DEFAULT_EVALUE, DEFAULT_HITLIST_SIZE, DEFAULT_WRITE_TIMEOUT_MS};
use crate::config::{ReadOrder, StreamKind, StreamOptions};

#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// Stream implementation: `collector` (merge by query/subject) or `queue` (FIFO)
    #[arg(long, default_value = "collector")]
    pub stream: StreamKind,
    /// Queue stream: maximum buffered batches (0 = unbounded)
    #[arg(long, default_value_t = 0)]
    pub capacity: usize,
    /// Queue stream: milliseconds a write waits for space before giving up
    #[arg(long, default_value_t = DEFAULT_WRITE_TIMEOUT_MS)]
    pub write_timeout_ms: u64,
    /// Collector stream: `query` or `subject`
    #[arg(long, default_value = "query")]
    pub read_order: ReadOrder,
    #[arg(short, long, default_value_t = DEFAULT_EVALUE)]
    pub evalue: f64,
    /// Subjects kept per query (0 = all)
    #[arg(long, default_value_t = DEFAULT_HITLIST_SIZE)]
    pub max_target_seqs: usize,
}

impl StreamArgs {
    pub fn to_options(&self) -> StreamOptions {
        StreamOptions {
            kind: self.stream,
            capacity: (self.capacity > 0).then_some(self.capacity),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            read_order: self.read_order,
            evalue: self.evalue,
            hitlist_size: self.max_target_seqs,
        }
    }
}
