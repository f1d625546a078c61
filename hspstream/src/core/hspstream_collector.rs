//! Collecting HSP stream
//!
//! Buffers `HspList`s grouped by query and subject. Lists written for the
//! same `(query_index, oid)` pair are concatenated into one. Nothing can be
//! read until the stream is closed: closing runs the configured
//! [`HspWriter`]s over each query, sorts HSPs within every list by score and
//! fixes the read order. Each read then hands out one list.
//!
//! Per-thread collectors can be folded into a shared one with
//! [`merge_streams`] before it is closed.

use std::collections::VecDeque;

use log::debug;
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use super::blast_hspstream::{
    HspStream, HspStreamHandle, HspStreamMethods, NewInfo, Status, StreamBuilder, StreamState,
};
use super::hsp_writer::HspWriter;
use crate::common::{evalue_compare_hsp_lists, HspList};
use crate::config::ReadOrder;
use crate::error::Result;

type QueryResults = FxHashMap<u32, FxHashMap<u32, HspList>>;

#[derive(Default)]
pub struct CollectorOptions {
    pub read_order: ReadOrder,
    pub writers: Vec<Box<dyn HspWriter>>,
}

impl CollectorOptions {
    pub fn new(read_order: ReadOrder) -> Self {
        Self {
            read_order,
            writers: Vec::new(),
        }
    }

    pub fn with_writer<W: HspWriter + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Box::new(writer));
        self
    }
}

#[derive(Default)]
struct CollectorState {
    /// query_index -> oid -> list
    results: QueryResults,
    ready: VecDeque<HspList>,
    closed: bool,
}

pub struct CollectorStream {
    state: Mutex<CollectorState>,
    closed_cv: Condvar,
    read_order: ReadOrder,
    writers: Vec<Box<dyn HspWriter>>,
}

fn merge_into(results: &mut QueryResults, list: HspList) {
    let subjects = results.entry(list.query_index).or_default();
    match subjects.get_mut(&list.oid) {
        Some(existing) => existing.absorb(list),
        None => {
            subjects.insert(list.oid, list);
        }
    }
}

impl CollectorStream {
    pub fn new(options: CollectorOptions) -> Self {
        Self {
            state: Mutex::new(CollectorState::default()),
            closed_cv: Condvar::new(),
            read_order: options.read_order,
            writers: options.writers,
        }
    }

    pub fn read_order(&self) -> ReadOrder {
        self.read_order
    }

    /// Number of buffered lists, before close or still unread after it
    pub fn pending(&self) -> usize {
        let state = self.state.lock();
        if state.closed {
            state.ready.len()
        } else {
            state.results.values().map(|subjects| subjects.len()).sum()
        }
    }

    /// Move every buffered list of `other` into this stream.
    ///
    /// Both streams must still be open. On `Error` nothing is moved.
    pub fn merge_from(&self, other: &CollectorStream) -> Status {
        if std::ptr::eq(self, other) {
            return Status::Success;
        }

        // Both locks are always taken in address order.
        let (mut dst, mut src) = if (self as *const Self) < (other as *const Self) {
            let dst = self.state.lock();
            (dst, other.state.lock())
        } else {
            let src = other.state.lock();
            (self.state.lock(), src)
        };
        if dst.closed || src.closed {
            return Status::Error;
        }

        let taken = std::mem::take(&mut src.results);
        drop(src);
        let mut merged = 0usize;
        for list in taken.into_values().flat_map(|subjects| subjects.into_values()) {
            merge_into(&mut dst.results, list);
            merged += 1;
        }
        debug!("merged {} HSP lists into collector stream", merged);
        Status::Success
    }

    /// Pop the next list together with every other unread list for the same
    /// subject.
    pub fn batch_read(&self, out: &mut Vec<HspList>) -> Status {
        let mut state = self.state.lock();
        while !state.closed {
            self.closed_cv.wait(&mut state);
        }
        let Some(first) = state.ready.pop_front() else {
            return Status::Eof;
        };
        let oid = first.oid;
        out.push(first);
        let (same, rest): (VecDeque<HspList>, VecDeque<HspList>) =
            state.ready.drain(..).partition(|l| l.oid == oid);
        state.ready = rest;
        out.extend(same);
        Status::Success
    }

    fn finalize(&self, results: QueryResults) -> VecDeque<HspList> {
        let mut queries: Vec<(u32, FxHashMap<u32, HspList>)> = results.into_iter().collect();
        queries.sort_by_key(|(query_index, _)| *query_index);

        let mut ordered: Vec<HspList> = Vec::new();
        for (query_index, subjects) in queries {
            let mut lists: Vec<HspList> = subjects.into_values().collect();
            for writer in &self.writers {
                let before = lists.len();
                writer.run(query_index, &mut lists);
                lists.retain(|l| !l.is_empty());
                if lists.len() != before {
                    debug!(
                        "writer {} on query {}: {} -> {} subjects",
                        writer.name(),
                        query_index,
                        before,
                        lists.len()
                    );
                }
            }
            for list in lists.iter_mut() {
                list.sort_by_score();
            }
            lists.sort_by(evalue_compare_hsp_lists);
            ordered.extend(lists);
        }

        if self.read_order == ReadOrder::BySubject {
            // Stable: within a subject, queries stay in ascending order.
            ordered.sort_by_key(|l| (l.oid, l.query_index));
        }
        ordered.into()
    }
}

impl HspStreamMethods<HspList> for CollectorStream {
    fn write(&self, batch: &mut Option<HspList>) -> Status {
        let mut state = self.state.lock();
        if state.closed {
            return Status::Error;
        }
        if let Some(list) = batch.take() {
            if !list.is_empty() {
                merge_into(&mut state.results, list);
            }
        }
        Status::Success
    }

    fn read(&self, batch: &mut Option<HspList>) -> Status {
        let mut state = self.state.lock();
        while !state.closed {
            self.closed_cv.wait(&mut state);
        }
        match state.ready.pop_front() {
            Some(list) => {
                *batch = Some(list);
                Status::Success
            }
            None => Status::Eof,
        }
    }

    fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let results = std::mem::take(&mut state.results);
        state.ready = self.finalize(results);
        state.closed = true;
        self.closed_cv.notify_all();
    }

    fn release(self: Box<Self>) -> usize {
        let state = self.state.into_inner();
        let buffered: usize = state.results.values().map(|subjects| subjects.len()).sum();
        buffered + state.ready.len()
    }
}

/// Constructor for [`NewInfo`]
pub fn collector_stream_ctor(
    builder: &mut StreamBuilder<HspList>,
    options: CollectorOptions,
) -> Result<()> {
    builder.install(CollectorStream::new(options));
    Ok(())
}

pub fn new_collector_stream(options: CollectorOptions) -> Result<HspStreamHandle<HspList>> {
    HspStream::new(NewInfo::new(collector_stream_ctor, options))
}

/// Fold the buffered results of `src` into `dst`.
///
/// `Error` when either stream is not a collector or is no longer open.
pub fn merge_streams(dst: &HspStream<HspList>, src: &HspStream<HspList>) -> Status {
    if dst.state() != StreamState::Ready || src.state() != StreamState::Ready {
        return Status::Error;
    }
    match (
        dst.private_data::<CollectorStream>(),
        src.private_data::<CollectorStream>(),
    ) {
        (Some(dst), Some(src)) => dst.merge_from(src),
        _ => Status::Error,
    }
}

/// Read every remaining list for the next subject at once.
///
/// `Error` when the stream is not a collector or has been freed.
pub fn batch_read(stream: &HspStream<HspList>, out: &mut Vec<HspList>) -> Status {
    if stream.state() == StreamState::Freed {
        return Status::Error;
    }
    match stream.private_data::<CollectorStream>() {
        Some(collector) => collector.batch_read(out),
        None => Status::Error,
    }
}
