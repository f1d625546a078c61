//! Argument parsing and the search simulation.

use std::time::Duration;

use clap::Parser;
use hspstream::api;
use hspstream::blastinput::simulate_args::SimulateArgs;
use hspstream::config::{ReadOrder, StreamKind, StreamOptions};
use hspstream::core::hspstream_queue::DEFAULT_WRITE_TIMEOUT;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    args: SimulateArgs,
}

fn parse(argv: &[&str]) -> SimulateArgs {
    let mut full = vec!["hspstream"];
    full.extend_from_slice(argv);
    TestCli::try_parse_from(full).unwrap().args
}

fn temp_out(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hspstream-{}-{}.tsv", name, std::process::id()))
}

#[test]
fn test_stream_args_to_options() {
    let args = parse(&[
        "--stream",
        "queue",
        "--capacity",
        "16",
        "--write-timeout-ms",
        "250",
        "--read-order",
        "subject",
        "-e",
        "0.001",
        "--max-target-seqs",
        "0",
    ]);
    let options = args.stream.to_options();
    assert_eq!(options.kind, StreamKind::Queue);
    assert_eq!(options.capacity, Some(16));
    assert_eq!(options.write_timeout, Duration::from_millis(250));
    assert_eq!(options.read_order, ReadOrder::BySubject);
    assert_eq!(options.evalue, 0.001);
    assert_eq!(options.hitlist_size, 0);

    let defaults = parse(&[]).stream.to_options();
    assert_eq!(defaults.kind, StreamKind::Collector);
    assert_eq!(defaults.capacity, None);
    assert_eq!(defaults.write_timeout, DEFAULT_WRITE_TIMEOUT);
    assert_eq!(defaults, StreamOptions::default());
}

#[test]
fn test_rejects_unknown_stream_kind() {
    assert!(TestCli::try_parse_from(["hspstream", "--stream", "spill-to-disk"]).is_err());
    assert!(TestCli::try_parse_from(["hspstream", "--read-order", "score"]).is_err());
}

#[test]
fn test_simulate_queue_delivers_everything() {
    let out = temp_out("queue");
    let mut args = parse(&[
        "--queries",
        "3",
        "--subjects",
        "40",
        "--hsps-per-subject",
        "2",
        "--num-threads",
        "4",
        "--stream",
        "queue",
        "--capacity",
        "8",
    ]);
    args.out = Some(out.clone());

    let summary = api::run(args).unwrap();
    assert_eq!(summary.lists_written, 120);
    assert_eq!(summary.hsps_written, 240);
    assert_eq!(summary.lists_read, summary.lists_written);
    assert_eq!(summary.hsps_read, summary.hsps_written);

    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 240);
    std::fs::remove_file(out).ok();
}

#[test]
fn test_simulate_collector_filters() {
    let out = temp_out("collector");
    let mut args = parse(&[
        "--queries",
        "2",
        "--subjects",
        "30",
        "--num-threads",
        "2",
        "-e",
        "1e-3",
        "--max-target-seqs",
        "5",
    ]);
    args.out = Some(out.clone());

    let summary = api::run(args).unwrap();
    assert_eq!(summary.lists_written, 60);
    assert!(summary.lists_read <= 2 * 5);
    assert!(summary.hsps_read <= summary.hsps_written);

    let text = std::fs::read_to_string(&out).unwrap();
    for line in text.lines() {
        let evalue: f64 = line.split('\t').nth(7).unwrap().parse().unwrap();
        assert!(evalue <= 1e-3);
    }
    std::fs::remove_file(out).ok();
}
