//! Test utilities and helpers
//!
//! - HSP list fixtures
//! - Hand-wired streams built through `set_method`
//! - Constructors that deliberately leave methods unset

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hspstream::core::hspstream_collector::{new_collector_stream, CollectorOptions};
use hspstream::core::hspstream_queue::{new_queue_stream, QueueOptions};
use hspstream::{
    Hsp, HspList, HspStreamHandle, Method, MethodRole, Status, StreamBuilder, StreamContext,
    StreamError,
};
use parking_lot::Mutex;

/// Create a one-HSP list whose e-value falls with `score`
pub fn make_list(query_index: u32, oid: u32, score: i32) -> HspList {
    let hsp = Hsp::new(score, 1.0 / score as f64, (0, 20), (100, 120));
    HspList::with_hsps(query_index, oid, vec![hsp])
}

/// Which concrete stream a parameterised test runs against
#[derive(Debug, Clone, Copy)]
pub enum Variant {
    Queue,
    Collector,
}

pub fn make_stream(variant: Variant) -> HspStreamHandle<HspList> {
    match variant {
        Variant::Queue => new_queue_stream(QueueOptions::default()).unwrap(),
        Variant::Collector => new_collector_stream(CollectorOptions::default()).unwrap(),
    }
}

/// State of [`concat_stream_ctor`]
#[derive(Default)]
pub struct ConcatState {
    values: Vec<u32>,
    closed: bool,
    delivered: bool,
}

/// Merges every written batch into a single buffer, delivered by one read
/// after close; reading earlier is an error. Counts destructor calls in
/// `drops`.
pub fn concat_stream_ctor(
    builder: &mut StreamBuilder<Vec<u32>>,
    drops: Arc<AtomicUsize>,
) -> Result<(), StreamError> {
    builder
        .set_private_data(Mutex::new(ConcatState::default()))
        .set_method(Method::write(|ctx: &StreamContext, batch: &mut Option<Vec<u32>>| {
            let Some(state) = ctx.private_data::<Mutex<ConcatState>>() else {
                return Status::Error;
            };
            let mut state = state.lock();
            if state.closed {
                return Status::Error;
            }
            if let Some(values) = batch.take() {
                state.values.extend(values);
            }
            Status::Success
        }))
        .set_method(Method::read(|ctx: &StreamContext, batch: &mut Option<Vec<u32>>| {
            let Some(state) = ctx.private_data::<Mutex<ConcatState>>() else {
                return Status::Error;
            };
            let mut state = state.lock();
            if !state.closed {
                return Status::Error;
            }
            if state.delivered {
                return Status::Eof;
            }
            state.delivered = true;
            *batch = Some(std::mem::take(&mut state.values));
            Status::Success
        }))
        .set_method(Method::close(|ctx: &StreamContext| {
            if let Some(state) = ctx.private_data::<Mutex<ConcatState>>() {
                state.lock().closed = true;
            }
        }))
        .set_method(Method::destructor(move |ctx: &mut StreamContext| {
            ctx.take_private_data::<Mutex<ConcatState>>();
            drops.fetch_add(1, Ordering::SeqCst);
        }));
    Ok(())
}

/// Registers every required method except `skip`.
pub fn partial_ctor(builder: &mut StreamBuilder<u32>, skip: MethodRole) -> Result<(), StreamError> {
    if skip != MethodRole::Write {
        builder.set_method(Method::write(|_, batch: &mut Option<u32>| {
            batch.take();
            Status::Success
        }));
    }
    if skip != MethodRole::Read {
        builder.set_method(Method::read(|_, _: &mut Option<u32>| Status::Eof));
    }
    if skip != MethodRole::Destructor {
        builder.set_method(Method::destructor(|_| {}));
    }
    Ok(())
}
