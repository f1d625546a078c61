//! Dispatch and ownership contract shared by every stream.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hspstream::core::hspstream_queue::{QueueOptions, QueueStream};
use hspstream::{
    hsp_stream_close, hsp_stream_free, hsp_stream_new, hsp_stream_read, hsp_stream_write,
    HspList, HspStream, MethodRole, NewInfo, Status, StreamError, StreamState,
};
use rstest::rstest;

use crate::helpers::{concat_stream_ctor, make_list, make_stream, partial_ctor, Variant};

#[test]
fn test_complete_constructor_never_reports_dispatch_error() {
    let stream = HspStream::<u32>::from_impl(QueueStream::new(QueueOptions::default())).unwrap();
    assert_eq!(stream.state(), StreamState::Ready);
    for role in [MethodRole::Destructor, MethodRole::Read, MethodRole::Write] {
        assert!(stream.has_method(role), "{} not registered", role);
    }
    for i in 0..10 {
        let mut b = Some(i);
        assert_eq!(stream.write(&mut b), Status::Success);
    }
    stream.close();
    let mut out = None;
    while stream.read(&mut out) == Status::Success {
        assert!(out.take().is_some());
    }
    assert_eq!(stream.counters().snapshot().errors, 0);
}

#[rstest]
#[case(MethodRole::Destructor)]
#[case(MethodRole::Read)]
#[case(MethodRole::Write)]
fn test_incomplete_constructor_yields_no_stream(#[case] skip: MethodRole) {
    assert!(hsp_stream_new(NewInfo::new(partial_ctor, skip)).is_none());
    assert_eq!(
        HspStream::new(NewInfo::new(partial_ctor, skip)).err(),
        Some(StreamError::MissingMethod(skip))
    );
}

#[rstest]
#[case(Variant::Queue)]
#[case(Variant::Collector)]
fn test_write_consumes_batch(#[case] variant: Variant) {
    let stream = make_stream(variant);
    let mut batch = Some(make_list(0, 1, 40));
    assert_eq!(stream.write(&mut batch), Status::Success);
    assert!(batch.is_none());

    let mut nothing: Option<HspList> = None;
    assert_eq!(stream.write(&mut nothing), Status::Success);
}

#[rstest]
#[case(Variant::Queue)]
#[case(Variant::Collector)]
fn test_read_never_delivers_twice(#[case] variant: Variant) {
    let stream = make_stream(variant);
    for oid in 0..20 {
        let mut batch = Some(make_list(0, oid, 10 + oid as i32));
        assert_eq!(stream.write(&mut batch), Status::Success);
    }
    stream.close();

    let mut seen = HashSet::new();
    let mut out = None;
    while stream.read(&mut out) == Status::Success {
        let list = out.take().expect("Success must deliver a batch");
        assert!(seen.insert(list.oid), "oid {} delivered twice", list.oid);
    }
    assert_eq!(seen.len(), 20);
}

#[rstest]
#[case(Variant::Queue)]
#[case(Variant::Collector)]
fn test_drain_then_eof_forever(#[case] variant: Variant) {
    let stream = make_stream(variant);
    for q in 0..3 {
        let mut batch = Some(make_list(q, 0, 30));
        assert_eq!(stream.write(&mut batch), Status::Success);
    }
    stream.close();

    for _ in 0..3 {
        assert_eq!(stream.read_batch().0, Status::Success);
    }
    for _ in 0..5 {
        let mut out = None;
        assert_eq!(stream.read(&mut out), Status::Eof);
        assert!(out.is_none());
    }
}

#[test]
fn test_concatenation_round_trip_loses_nothing() {
    let drops = Arc::new(AtomicUsize::new(0));
    let stream = HspStream::new(NewInfo::new(concat_stream_ctor, drops.clone())).unwrap();
    for value in 1..=3 {
        let mut batch = Some(vec![value]);
        assert_eq!(stream.write(&mut batch), Status::Success);
        assert!(batch.is_none());
    }
    stream.close();

    let mut delivered: Vec<u32> = stream.reader().flatten().collect();
    delivered.sort_unstable();
    assert_eq!(delivered, vec![1, 2, 3]);
    assert_eq!(stream.read_batch(), (Status::Eof, None));

    assert!(hsp_stream_free(Some(stream)).is_none());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_free_null_and_free_once() {
    assert!(hsp_stream_free::<u32>(None).is_none());

    let drops = Arc::new(AtomicUsize::new(0));
    let stream = HspStream::new(NewInfo::new(concat_stream_ctor, drops.clone())).unwrap();
    assert!(hsp_stream_free(Some(stream)).is_none());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_null_stream_is_an_error() {
    let mut batch = Some(make_list(0, 0, 10));
    assert_eq!(hsp_stream_write(None, &mut batch), Status::Error);
    assert!(batch.is_some());

    let mut out = Some(make_list(1, 1, 10));
    assert_eq!(hsp_stream_read::<HspList>(None, &mut out), Status::Error);
    assert_eq!(out, Some(make_list(1, 1, 10)));

    hsp_stream_close::<HspList>(None);
}

#[rstest]
#[case(Variant::Queue)]
#[case(Variant::Collector)]
fn test_write_after_close_is_rejected(#[case] variant: Variant) {
    let stream = make_stream(variant);
    hsp_stream_close(Some(stream.as_ref()));
    let mut batch = Some(make_list(0, 0, 10));
    assert_eq!(hsp_stream_write(Some(stream.as_ref()), &mut batch), Status::Error);
    assert!(batch.is_some());
    assert_eq!(stream.read_batch(), (Status::Eof, None));
}
