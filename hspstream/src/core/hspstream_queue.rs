//! FIFO HSP stream
//!
//! Batches are delivered in the order they were written, one per read; there
//! is no merging. Works for any batch type.
//!
//! - `read` blocks while the stream is open and empty, and returns `Eof` once
//!   it is closed and drained.
//! - With a capacity, `write` waits at most `write_timeout` for space and
//!   then returns `Timeout`, leaving the batch with the caller.
//! - Writes after close return `Error`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::warn;
use parking_lot::{Condvar, Mutex};

use super::blast_hspstream::{
    HspStream, HspStreamHandle, HspStreamMethods, NewInfo, Status, StreamBuilder,
};
use crate::error::Result;

pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    /// Maximum number of buffered batches; `None` for unbounded
    pub capacity: Option<usize>,
    pub write_timeout: Duration,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            capacity: None,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl QueueOptions {
    pub fn bounded(capacity: usize, write_timeout: Duration) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            write_timeout,
        }
    }
}

struct QueueState<B> {
    batches: VecDeque<B>,
    closed: bool,
}

pub struct QueueStream<B> {
    state: Mutex<QueueState<B>>,
    not_empty: Condvar,
    not_full: Condvar,
    options: QueueOptions,
}

impl<B> QueueStream<B> {
    pub fn new(options: QueueOptions) -> Self {
        Self {
            state: Mutex::new(QueueState {
                batches: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            options,
        }
    }

    /// Number of buffered batches
    pub fn pending(&self) -> usize {
        self.state.lock().batches.len()
    }
}

impl<B: Send + 'static> HspStreamMethods<B> for QueueStream<B> {
    fn write(&self, batch: &mut Option<B>) -> Status {
        let mut state = self.state.lock();
        if state.closed {
            return Status::Error;
        }

        if let Some(capacity) = self.options.capacity {
            let deadline = Instant::now() + self.options.write_timeout;
            while state.batches.len() >= capacity && !state.closed {
                if self.not_full.wait_until(&mut state, deadline).timed_out() {
                    break;
                }
            }
            if state.closed {
                return Status::Error;
            }
            if state.batches.len() >= capacity {
                warn!(
                    "HSP stream full ({} batches) after {:?}; write not accepted",
                    capacity, self.options.write_timeout
                );
                return Status::Timeout;
            }
        }

        if let Some(b) = batch.take() {
            state.batches.push_back(b);
            self.not_empty.notify_one();
        }
        Status::Success
    }

    fn read(&self, batch: &mut Option<B>) -> Status {
        let mut state = self.state.lock();
        loop {
            if let Some(b) = state.batches.pop_front() {
                self.not_full.notify_one();
                *batch = Some(b);
                return Status::Success;
            }
            if state.closed {
                return Status::Eof;
            }
            self.not_empty.wait(&mut state);
        }
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    fn release(self: Box<Self>) -> usize {
        self.state.into_inner().batches.len()
    }
}

/// Constructor for [`NewInfo`]
pub fn queue_stream_ctor<B: Send + 'static>(
    builder: &mut StreamBuilder<B>,
    options: QueueOptions,
) -> Result<()> {
    builder.install(QueueStream::<B>::new(options));
    Ok(())
}

pub fn new_queue_stream<B: Send + 'static>(options: QueueOptions) -> Result<HspStreamHandle<B>> {
    HspStream::new(NewInfo::new(queue_stream_ctor::<B>, options))
}
