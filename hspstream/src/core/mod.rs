//! HSP stream core
//!
//! # Structure
//!
//! - **Dispatch** (`blast_hspstream`)
//!   - Stream handle, method table and lifecycle
//!   - Nullable entry points (`hsp_stream_new`, `hsp_stream_write`, ...)
//!
//! - **Concrete streams** (`hspstream_queue`, `hspstream_collector`)
//!   - FIFO stream with optional backpressure
//!   - Collector merging HSP lists by query/subject, with merge and batch read
//!
//! - **Post-processing** (`hsp_writer`)
//!   - E-value and max-target-seqs filters run when a collector closes
//!
//! - **Diagnostics** (`blast_diagnostics`)
//!   - Per-stream dispatch counters

// Dispatch
pub mod blast_hspstream;

// Concrete streams
pub mod hspstream_collector;
pub mod hspstream_queue;

// Post-processing
pub mod hsp_writer;

// Diagnostics
pub mod blast_diagnostics;
