//! Collector stream through the public API.

use hspstream::api::build_stream;
use hspstream::config::{ReadOrder, StreamOptions};
use hspstream::core::hspstream_collector::batch_read;
use hspstream::{Hsp, HspList, Status};

use crate::helpers::make_list;

fn write(stream: &hspstream::HspStream<HspList>, list: HspList) {
    let mut batch = Some(list);
    assert_eq!(stream.write(&mut batch), Status::Success);
}

#[test]
fn test_max_target_seqs_and_evalue_applied_per_query() {
    let options = StreamOptions {
        evalue: 0.05,
        hitlist_size: 2,
        ..StreamOptions::default()
    };
    let stream = build_stream(&options).unwrap();
    // e-value = 1/score
    for (oid, score) in [(1, 100), (2, 50), (3, 40), (4, 10)] {
        write(&stream, make_list(0, oid, score));
    }
    write(&stream, make_list(1, 4, 200));
    stream.close();

    let got: Vec<(u32, u32)> = stream.reader().map(|l| (l.query_index, l.oid)).collect();
    // oid 4 fails the e-value for query 0; oid 3 is cut by max_target_seqs
    assert_eq!(got, vec![(0, 1), (0, 2), (1, 4)]);
}

#[test]
fn test_hsps_sorted_within_list() {
    let stream = build_stream(&StreamOptions::default()).unwrap();
    let hsps = vec![
        Hsp::new(30, 1e-5, (0, 10), (500, 510)),
        Hsp::new(90, 1e-20, (0, 10), (900, 910)),
        Hsp::new(30, 1e-5, (0, 10), (100, 110)),
    ];
    write(&stream, HspList::with_hsps(0, 0, hsps));
    stream.close();

    let (status, list) = stream.read_batch();
    assert_eq!(status, Status::Success);
    let starts: Vec<usize> = list.unwrap().hsps.iter().map(|h| h.s_start).collect();
    assert_eq!(starts, vec![900, 100, 500]);
}

#[test]
fn test_batch_read_by_subject_order() {
    let options = StreamOptions {
        read_order: ReadOrder::BySubject,
        ..StreamOptions::default()
    };
    let stream = build_stream(&options).unwrap();
    for q in 0..3 {
        for oid in [5, 2] {
            write(&stream, make_list(q, oid, 20));
        }
    }
    stream.close();

    let mut batches = Vec::new();
    loop {
        let mut out = Vec::new();
        match batch_read(&stream, &mut out) {
            Status::Success => batches.push(out),
            status => {
                assert_eq!(status, Status::Eof);
                break;
            }
        }
    }
    assert_eq!(batches.len(), 2);
    assert!(batches[0].iter().all(|l| l.oid == 2));
    let queries: Vec<u32> = batches[0].iter().map(|l| l.query_index).collect();
    assert_eq!(queries, vec![0, 1, 2]);
    assert!(batches[1].iter().all(|l| l.oid == 5));
}

#[test]
fn test_batch_read_on_queue_is_an_error() {
    let options = StreamOptions {
        kind: hspstream::config::StreamKind::Queue,
        ..StreamOptions::default()
    };
    let stream = build_stream(&options).unwrap();
    let mut out = Vec::new();
    assert_eq!(batch_read(&stream, &mut out), Status::Error);
}
