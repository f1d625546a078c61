use std::time::Duration;

use crate::blastinput::blast_args::{DEFAULT_EVALUE, DEFAULT_HITLIST_SIZE};
use crate::core::hspstream_queue::DEFAULT_WRITE_TIMEOUT;

/// Which concrete stream backs a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamKind {
    /// FIFO of batches, readable while producers are still writing
    Queue,
    /// Merge by query/subject, readable after close
    #[default]
    Collector,
}

impl std::str::FromStr for StreamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queue" | "fifo" => Ok(StreamKind::Queue),
            "collector" | "merge" => Ok(StreamKind::Collector),
            _ => Err(format!(
                "Unknown stream kind: {}. Use 'queue' or 'collector'",
                s
            )),
        }
    }
}

/// Order in which a collector stream hands out its lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadOrder {
    /// Query ascending, then best subject first
    #[default]
    ByQuery,
    /// Subject oid ascending, then query ascending
    BySubject,
}

impl std::str::FromStr for ReadOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "query" | "byquery" => Ok(ReadOrder::ByQuery),
            "subject" | "bysubject" | "oid" => Ok(ReadOrder::BySubject),
            _ => Err(format!(
                "Unknown read order: {}. Use 'query' or 'subject'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamOptions {
    pub kind: StreamKind,
    /// Queue only: maximum buffered batches, `None` for unbounded
    pub capacity: Option<usize>,
    /// Queue only: how long a write waits for space
    pub write_timeout: Duration,
    /// Collector only
    pub read_order: ReadOrder,
    /// Collector only: HSPs above this e-value are dropped at close
    pub evalue: f64,
    /// Collector only: subjects kept per query, 0 keeps all
    pub hitlist_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            kind: StreamKind::default(),
            capacity: None,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            read_order: ReadOrder::default(),
            evalue: DEFAULT_EVALUE,
            hitlist_size: DEFAULT_HITLIST_SIZE,
        }
    }
}
