//! Common argument defaults shared by the stream and driver arguments.

use crate::core::hspstream_queue::DEFAULT_WRITE_TIMEOUT;

pub const DEFAULT_EVALUE: f64 = 10.0;
pub const DEFAULT_NUM_THREADS: usize = 0;
pub const DEFAULT_HITLIST_SIZE: usize = 500;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = DEFAULT_WRITE_TIMEOUT.as_millis() as u64;
