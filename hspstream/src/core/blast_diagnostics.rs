//! Dispatch counters for HSP streams
//!
//! Every stream counts what passes through its dispatcher. The summary is
//! logged when the stream is destroyed: at `info` when the
//! HSPSTREAM_DIAGNOSTICS environment variable is set, at `debug` otherwise.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use log::{debug, info};

use super::blast_hspstream::Status;

/// Check if diagnostics are enabled via environment variable
pub fn diagnostics_enabled() -> bool {
    std::env::var("HSPSTREAM_DIAGNOSTICS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

#[derive(Default, Debug)]
pub struct StreamCounters {
    pub writes_accepted: AtomicUsize,
    /// Writes refused because the stream was closed or full
    pub writes_rejected: AtomicUsize,
    pub reads_delivered: AtomicUsize,
    pub reads_eof: AtomicUsize,
    pub errors: AtomicUsize,
}

/// Point-in-time copy of [`StreamCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub writes_accepted: usize,
    pub writes_rejected: usize,
    pub reads_delivered: usize,
    pub reads_eof: usize,
    pub errors: usize,
}

impl StreamCounters {
    pub fn record_write(&self, status: Status) {
        match status {
            Status::Success => self.writes_accepted.fetch_add(1, AtomicOrdering::Relaxed),
            Status::Timeout => self.writes_rejected.fetch_add(1, AtomicOrdering::Relaxed),
            _ => self.errors.fetch_add(1, AtomicOrdering::Relaxed),
        };
    }

    pub fn record_read(&self, status: Status) {
        match status {
            Status::Success => self.reads_delivered.fetch_add(1, AtomicOrdering::Relaxed),
            Status::Eof => self.reads_eof.fetch_add(1, AtomicOrdering::Relaxed),
            _ => self.errors.fetch_add(1, AtomicOrdering::Relaxed),
        };
    }

    pub fn record_rejected(&self) {
        self.writes_rejected.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            writes_accepted: self.writes_accepted.load(AtomicOrdering::Relaxed),
            writes_rejected: self.writes_rejected.load(AtomicOrdering::Relaxed),
            reads_delivered: self.reads_delivered.load(AtomicOrdering::Relaxed),
            reads_eof: self.reads_eof.load(AtomicOrdering::Relaxed),
            errors: self.errors.load(AtomicOrdering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let s = self.snapshot();
        let summary = format!(
            "HSP stream: writes={} rejected={} reads={} eof={} errors={}",
            s.writes_accepted, s.writes_rejected, s.reads_delivered, s.reads_eof, s.errors
        );
        if diagnostics_enabled() {
            info!("{}", summary);
        } else {
            debug!("{}", summary);
        }
    }
}
