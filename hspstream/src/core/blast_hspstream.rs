//! HSP Stream
//!
//! A stream decouples the search phase, where worker threads produce one
//! batch of HSPs per query/subject pair, from the traceback/formatting phase
//! that consumes them. The stream itself only dispatches: how batches are
//! buffered, merged and handed out is decided by the concrete implementation
//! registered at construction time.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized -> Constructing -> Ready -> Closing -> Freed
//! ```
//!
//! `Uninitialized` and `Constructing` only exist inside [`StreamBuilder`];
//! a handle returned by [`HspStream::new`] is always `Ready`.
//!
//! Writes after [`HspStream::close`] are rejected with [`Status::Error`].
//! [`hsp_stream_free`] may be called while other threads still hold clones of
//! the handle: the stream is marked freed (their calls fail with `Error`) and
//! the destructor runs once the last clone is dropped.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};
use std::sync::Arc;

use log::{debug, warn};

use super::blast_diagnostics::StreamCounters;
use crate::error::{Result, StreamError};

/// Outcome of a stream operation.
///
/// Callers must check it after every `write`/`read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Status {
    Success,
    /// Stream closed and fully drained
    Eof,
    Error,
    /// A bounded stream stayed full for the whole write timeout
    Timeout,
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    pub fn is_eof(self) -> bool {
        self == Status::Eof
    }

    pub fn is_error(self) -> bool {
        matches!(self, Status::Error | Status::Timeout)
    }

    /// Turn an error status into a [`StreamError`] so callers can use `?`.
    pub fn check(self, op: &'static str) -> Result<Status> {
        if self.is_error() {
            Err(StreamError::Dispatch { op, status: self })
        } else {
            Ok(self)
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Success => "success",
            Status::Eof => "end of stream",
            Status::Error => "error",
            Status::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// Slot in the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodRole {
    Constructor,
    Destructor,
    Read,
    Write,
    Close,
}

impl fmt::Display for MethodRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MethodRole::Constructor => "constructor",
            MethodRole::Destructor => "destructor",
            MethodRole::Read => "read",
            MethodRole::Write => "write",
            MethodRole::Close => "close",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Uninitialized,
    Constructing,
    Ready,
    Closing,
    Freed,
}

const STATE_READY: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_FREED: u8 = 2;

pub type ReadMethod<B> = Box<dyn Fn(&StreamContext, &mut Option<B>) -> Status + Send + Sync>;
pub type WriteMethod<B> = Box<dyn Fn(&StreamContext, &mut Option<B>) -> Status + Send + Sync>;
pub type CloseMethod = Box<dyn Fn(&StreamContext) + Send + Sync>;
pub type DestructorMethod = Box<dyn FnOnce(&mut StreamContext) + Send + Sync>;

/// A capability registered with [`StreamBuilder::set_method`]. The variant is
/// the role it fills.
pub enum Method<B> {
    Destructor(DestructorMethod),
    Read(ReadMethod<B>),
    Write(WriteMethod<B>),
    Close(CloseMethod),
}

impl<B> Method<B> {
    pub fn read<F>(f: F) -> Self
    where
        F: Fn(&StreamContext, &mut Option<B>) -> Status + Send + Sync + 'static,
    {
        Method::Read(Box::new(f))
    }

    pub fn write<F>(f: F) -> Self
    where
        F: Fn(&StreamContext, &mut Option<B>) -> Status + Send + Sync + 'static,
    {
        Method::Write(Box::new(f))
    }

    pub fn close<F>(f: F) -> Self
    where
        F: Fn(&StreamContext) + Send + Sync + 'static,
    {
        Method::Close(Box::new(f))
    }

    pub fn destructor<F>(f: F) -> Self
    where
        F: FnOnce(&mut StreamContext) + Send + Sync + 'static,
    {
        Method::Destructor(Box::new(f))
    }

    pub fn role(&self) -> MethodRole {
        match self {
            Method::Destructor(_) => MethodRole::Destructor,
            Method::Read(_) => MethodRole::Read,
            Method::Write(_) => MethodRole::Write,
            Method::Close(_) => MethodRole::Close,
        }
    }
}

/// Implementation-owned state of a stream, handed to every registered method.
#[derive(Default)]
pub struct StreamContext {
    private_data: Option<Box<dyn Any + Send + Sync>>,
}

impl StreamContext {
    pub fn private_data<T: Any>(&self) -> Option<&T> {
        self.private_data.as_deref()?.downcast_ref::<T>()
    }

    /// Remove the private data if it is a `T`; otherwise leave it in place.
    pub fn take_private_data<T: Any>(&mut self) -> Option<Box<T>> {
        let data = self.private_data.take()?;
        match data.downcast::<T>() {
            Ok(data) => Some(data),
            Err(data) => {
                self.private_data = Some(data);
                None
            }
        }
    }
}

struct MethodTable<B> {
    destructor: Option<DestructorMethod>,
    read: Option<ReadMethod<B>>,
    write: Option<WriteMethod<B>>,
    close: Option<CloseMethod>,
}

impl<B> Default for MethodTable<B> {
    fn default() -> Self {
        Self {
            destructor: None,
            read: None,
            write: None,
            close: None,
        }
    }
}

impl<B> MethodTable<B> {
    fn has(&self, role: MethodRole) -> bool {
        match role {
            MethodRole::Constructor => true,
            MethodRole::Destructor => self.destructor.is_some(),
            MethodRole::Read => self.read.is_some(),
            MethodRole::Write => self.write.is_some(),
            MethodRole::Close => self.close.is_some(),
        }
    }
}

/// Interface implemented by concrete streams.
///
/// [`StreamBuilder::install`] stores the implementation as private data and
/// wires every dispatch slot to it. Implementations are shared between all
/// producer and consumer threads, so all methods take `&self`.
pub trait HspStreamMethods<B>: Send + Sync + 'static {
    /// Merge `*batch` into the stream. On `Success` the slot must be left empty.
    fn write(&self, batch: &mut Option<B>) -> Status;

    /// Move the next unit of work into `*batch`.
    fn read(&self, batch: &mut Option<B>) -> Status;

    /// No further writes will occur.
    fn close(&self) {}

    /// Tear down, returning how many buffered batches were never read.
    fn release(self: Box<Self>) -> usize {
        0
    }
}

/// The stream while its constructor runs.
pub struct StreamBuilder<B> {
    methods: MethodTable<B>,
    context: StreamContext,
    state: StreamState,
}

impl<B: 'static> StreamBuilder<B> {
    fn new() -> Self {
        Self {
            methods: MethodTable::default(),
            context: StreamContext::default(),
            state: StreamState::Uninitialized,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn set_method(&mut self, method: Method<B>) -> &mut Self {
        let role = method.role();
        if self.methods.has(role) {
            debug!("HSP stream {} method replaced during construction", role);
        }
        match method {
            Method::Destructor(f) => self.methods.destructor = Some(f),
            Method::Read(f) => self.methods.read = Some(f),
            Method::Write(f) => self.methods.write = Some(f),
            Method::Close(f) => self.methods.close = Some(f),
        }
        self
    }

    pub fn has_method(&self, role: MethodRole) -> bool {
        match role {
            MethodRole::Constructor => self.state == StreamState::Constructing,
            _ => self.methods.has(role),
        }
    }

    pub fn set_private_data<T: Any + Send + Sync>(&mut self, data: T) -> &mut Self {
        self.context.private_data = Some(Box::new(data));
        self
    }

    pub fn private_data<T: Any>(&self) -> Option<&T> {
        self.context.private_data::<T>()
    }

    /// Register `stream` as private data and route every method to it.
    pub fn install<T: HspStreamMethods<B>>(&mut self, stream: T) -> &mut Self {
        self.set_private_data(stream);
        self.set_method(Method::write(|ctx, batch| match ctx.private_data::<T>() {
            Some(stream) => stream.write(batch),
            None => Status::Error,
        }));
        self.set_method(Method::read(|ctx, batch| match ctx.private_data::<T>() {
            Some(stream) => stream.read(batch),
            None => Status::Error,
        }));
        self.set_method(Method::close(|ctx| {
            if let Some(stream) = ctx.private_data::<T>() {
                stream.close();
            }
        }));
        self.set_method(Method::destructor(|ctx| {
            if let Some(stream) = ctx.take_private_data::<T>() {
                let abandoned = stream.release();
                if abandoned > 0 {
                    debug!("HSP stream destroyed with {} unread batches", abandoned);
                }
            }
        }))
    }

    fn finish(self) -> Result<HspStream<B>> {
        let missing = [MethodRole::Destructor, MethodRole::Read, MethodRole::Write]
            .into_iter()
            .find(|&role| !self.methods.has(role));
        if let Some(role) = missing {
            self.discard();
            return Err(StreamError::MissingMethod(role));
        }
        Ok(HspStream {
            methods: self.methods,
            context: self.context,
            state: AtomicU8::new(STATE_READY),
            counters: StreamCounters::default(),
        })
    }

    /// Release whatever a failed constructor managed to set up.
    fn discard(mut self) {
        if let Some(destructor) = self.methods.destructor.take() {
            destructor(&mut self.context);
        }
    }
}

/// Constructor plus the argument it is called with.
pub struct NewInfo<F, A> {
    pub constructor: F,
    pub ctor_argument: A,
}

impl<F, A> NewInfo<F, A> {
    pub fn new(constructor: F, ctor_argument: A) -> Self {
        Self {
            constructor,
            ctor_argument,
        }
    }
}

/// Shared handle to a stream. Producers and consumers each hold a clone.
pub type HspStreamHandle<B> = Arc<HspStream<B>>;

enum Dispatch<'a, B> {
    Read(&'a mut Option<B>),
    Write(&'a mut Option<B>),
}

/// A constructed stream.
pub struct HspStream<B> {
    methods: MethodTable<B>,
    context: StreamContext,
    state: AtomicU8,
    counters: StreamCounters,
}

impl<B: 'static> HspStream<B> {
    /// Build a stream by running `info.constructor` against a fresh builder.
    ///
    /// Fails if the constructor fails or leaves the destructor, read or write
    /// method unset. Anything the constructor registered is released first.
    pub fn new<F, A>(info: NewInfo<F, A>) -> Result<HspStreamHandle<B>>
    where
        F: FnOnce(&mut StreamBuilder<B>, A) -> Result<()>,
    {
        let mut builder = StreamBuilder::new();
        builder.state = StreamState::Constructing;
        if let Err(e) = (info.constructor)(&mut builder, info.ctor_argument) {
            builder.discard();
            return Err(e);
        }
        builder.finish().map(Arc::new)
    }

    /// Build a stream from a concrete implementation.
    pub fn from_impl<T: HspStreamMethods<B>>(stream: T) -> Result<HspStreamHandle<B>> {
        Self::new(NewInfo::new(
            |builder: &mut StreamBuilder<B>, stream: T| {
                builder.install(stream);
                Ok(())
            },
            stream,
        ))
    }
}

impl<B> HspStream<B> {
    pub fn state(&self) -> StreamState {
        match self.state.load(AtomicOrdering::Acquire) {
            STATE_READY => StreamState::Ready,
            STATE_CLOSING => StreamState::Closing,
            _ => StreamState::Freed,
        }
    }

    pub fn has_method(&self, role: MethodRole) -> bool {
        self.methods.has(role)
    }

    /// Typed access to the implementation's private data.
    pub fn private_data<T: Any>(&self) -> Option<&T> {
        self.context.private_data::<T>()
    }

    pub fn counters(&self) -> &StreamCounters {
        &self.counters
    }

    /// Hand `*batch` to the stream. An empty slot is a successful no-op,
    /// even after close.
    ///
    /// On `Success` the slot is empty. On any other status the batch stays
    /// with the caller unless the implementation documents otherwise.
    pub fn write(&self, batch: &mut Option<B>) -> Status {
        self.dispatch(Dispatch::Write(batch))
    }

    /// Take the next batch. `Success` leaves `*batch` filled, `Eof` leaves it
    /// empty.
    pub fn read(&self, batch: &mut Option<B>) -> Status {
        self.dispatch(Dispatch::Read(batch))
    }

    pub fn read_batch(&self) -> (Status, Option<B>) {
        let mut out = None;
        let status = self.read(&mut out);
        (status, out)
    }

    /// Iterate over batches until end of stream or an error.
    pub fn reader(&self) -> HspStreamReader<'_, B> {
        HspStreamReader {
            stream: self,
            status: None,
        }
    }

    /// Signal that no more writes will occur. Only the first call reaches the
    /// implementation.
    pub fn close(&self) {
        if self
            .state
            .compare_exchange(
                STATE_READY,
                STATE_CLOSING,
                AtomicOrdering::AcqRel,
                AtomicOrdering::Acquire,
            )
            .is_err()
        {
            return;
        }
        if let Some(close) = self.methods.close.as_ref() {
            close(&self.context);
        }
    }

    /// Drop the caller's reference after marking the stream unusable.
    ///
    /// The destructor runs when the last handle goes away; with a single
    /// owner that is before this returns.
    pub fn free(this: HspStreamHandle<B>) -> Option<HspStreamHandle<B>> {
        let previous = this.state.swap(STATE_FREED, AtomicOrdering::AcqRel);
        // Wake blocked readers on other handles.
        if previous == STATE_READY {
            if let Some(close) = this.methods.close.as_ref() {
                close(&this.context);
            }
        }
        let others = Arc::strong_count(&this) - 1;
        if others > 0 {
            debug!(
                "HSP stream freed with {} other handles alive; destructor deferred",
                others
            );
        }
        None
    }

    fn dispatch(&self, call: Dispatch<'_, B>) -> Status {
        let state = self.state.load(AtomicOrdering::Acquire);
        if state == STATE_FREED {
            warn!("HSP stream used after free");
            self.counters.record_error();
            return Status::Error;
        }

        match call {
            Dispatch::Write(batch) => {
                let Some(write) = self.methods.write.as_ref() else {
                    self.counters.record_error();
                    return Status::Error;
                };
                if batch.is_none() {
                    return Status::Success;
                }
                if state == STATE_CLOSING {
                    warn!("write to a closed HSP stream rejected");
                    self.counters.record_rejected();
                    return Status::Error;
                }
                let status = write(&self.context, batch);
                debug_assert!(!status.is_success() || batch.is_none());
                self.counters.record_write(status);
                status
            }
            Dispatch::Read(batch) => {
                let Some(read) = self.methods.read.as_ref() else {
                    self.counters.record_error();
                    return Status::Error;
                };
                let status = read(&self.context, batch);
                debug_assert!(!status.is_success() || batch.is_some());
                self.counters.record_read(status);
                status
            }
        }
    }
}

impl<B> Drop for HspStream<B> {
    fn drop(&mut self) {
        if let Some(destructor) = self.methods.destructor.take() {
            destructor(&mut self.context);
        }
        self.counters.log_summary();
    }
}

impl<B> fmt::Debug for HspStream<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HspStream")
            .field("state", &self.state())
            .field("close", &self.methods.close.is_some())
            .field("counters", &self.counters.snapshot())
            .finish()
    }
}

/// Iterator over a stream's batches; see [`HspStream::reader`].
pub struct HspStreamReader<'a, B> {
    stream: &'a HspStream<B>,
    status: Option<Status>,
}

impl<B> HspStreamReader<'_, B> {
    /// Status that ended iteration, `None` while still reading.
    pub fn status(&self) -> Option<Status> {
        self.status
    }
}

impl<B> Iterator for HspStreamReader<'_, B> {
    type Item = B;

    fn next(&mut self) -> Option<B> {
        if self.status.is_some() {
            return None;
        }
        let mut out = None;
        match self.stream.read(&mut out) {
            Status::Success => {
                if out.is_none() {
                    self.status = Some(Status::Error);
                }
                out
            }
            other => {
                self.status = Some(other);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Nullable entry points
// ---------------------------------------------------------------------------

/// Like [`HspStream::new`] but reports failure as `None`.
pub fn hsp_stream_new<B, F, A>(info: NewInfo<F, A>) -> Option<HspStreamHandle<B>>
where
    B: 'static,
    F: FnOnce(&mut StreamBuilder<B>, A) -> Result<()>,
{
    match HspStream::new(info) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("HSP stream construction failed: {}", e);
            None
        }
    }
}

/// Free a stream. Always returns `None`.
pub fn hsp_stream_free<B>(stream: Option<HspStreamHandle<B>>) -> Option<HspStreamHandle<B>> {
    stream.and_then(HspStream::free)
}

pub fn hsp_stream_close<B>(stream: Option<&HspStream<B>>) {
    if let Some(stream) = stream {
        stream.close();
    }
}

/// `Error` without touching `batch` when there is no stream.
pub fn hsp_stream_write<B>(stream: Option<&HspStream<B>>, batch: &mut Option<B>) -> Status {
    match stream {
        Some(stream) => stream.write(batch),
        None => Status::Error,
    }
}

/// `Error` without touching `batch` when there is no stream.
pub fn hsp_stream_read<B>(stream: Option<&HspStream<B>>, batch: &mut Option<B>) -> Status {
    match stream {
        Some(stream) => stream.read(batch),
        None => Status::Error,
    }
}
