//! Search simulation
//!
//! Stands in for the seed search so a stream can be driven end to end: a
//! rayon pool produces one synthetic `HspList` per query/subject pair and
//! writes it to the stream, while a consumer thread drains the stream to
//! tabular output.

use std::io::Write;
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;

use super::stream_factory::build_stream;
use crate::blastinput::simulate_args::SimulateArgs;
use crate::common::{Hsp, HspList};
use crate::core::blast_hspstream::{HspStream, Status};
use crate::error::StreamError;
use crate::report::outfmt6::{open_output, write_hsp_list};

// BLOSUM62 ungapped Karlin parameters and a fixed search space
const LAMBDA: f64 = 0.267;
const K: f64 = 0.041;
const SEARCH_SPACE: f64 = 1.0e6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub lists_written: usize,
    pub hsps_written: usize,
    pub lists_read: usize,
    pub hsps_read: usize,
}

#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic stand-in for the HSPs found between one query and one
/// subject.
pub fn synthetic_hsp_list(seed: u64, query_index: u32, oid: u32, num_hsps: usize) -> HspList {
    let mut list = HspList::new(query_index, oid);
    let mut state = seed ^ ((query_index as u64) << 32) ^ oid as u64;
    for _ in 0..num_hsps {
        state = splitmix64(state);
        let score = 20 + (state % 180) as i32;
        let q_start = ((state >> 16) % 1000) as usize;
        let s_start = ((state >> 32) % 5000) as usize;
        let len = 10 + score as usize / 2;
        let e_value = K * SEARCH_SPACE * (-LAMBDA * score as f64).exp();
        let bit_score = (LAMBDA * score as f64 - K.ln()) / std::f64::consts::LN_2;
        list.push(
            Hsp::new(
                score,
                e_value,
                (q_start, q_start + len - 1),
                (s_start, s_start + len - 1),
            )
            .with_bit_score(bit_score),
        );
    }
    list
}

/// Read `stream` until end of stream, writing every list. Returns
/// (lists, HSPs) read.
pub fn drain_to_output<W: Write + ?Sized>(
    stream: &HspStream<HspList>,
    out: &mut W,
) -> Result<(usize, usize)> {
    let mut lists = 0usize;
    let mut hsps = 0usize;
    let mut reader = stream.reader();
    for list in reader.by_ref() {
        write_hsp_list(out, &list)?;
        lists += 1;
        hsps += list.len();
    }
    match reader.status() {
        Some(Status::Eof) => {}
        other => bail!("reading HSP stream stopped with {:?}", other),
    }
    out.flush()?;
    Ok((lists, hsps))
}

pub fn run(args: SimulateArgs) -> Result<SearchSummary> {
    let options = args.stream.to_options();
    let stream = build_stream(&options).context("Failed to set up HSP stream")?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .build()
        .context("Failed to build thread pool")?;

    let mut out = open_output(args.out.as_deref())?;
    let consumer = {
        let stream = Arc::clone(&stream);
        thread::spawn(move || drain_to_output(&stream, &mut out))
    };

    let bar = if args.verbose {
        let bar = ProgressBar::new(args.subjects as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                .context("Invalid progress bar template")?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let produced = pool.install(|| {
        (0..args.subjects)
            .into_par_iter()
            .map(|oid| -> std::result::Result<(usize, usize), StreamError> {
                let mut lists = 0usize;
                let mut hsps = 0usize;
                for query_index in 0..args.queries {
                    let list =
                        synthetic_hsp_list(args.seed, query_index, oid, args.hsps_per_subject);
                    let n = list.len();
                    let mut batch = Some(list);
                    stream.write(&mut batch).check("write")?;
                    lists += 1;
                    hsps += n;
                }
                bar.inc(1);
                Ok((lists, hsps))
            })
            .try_reduce(|| (0, 0), |a, b| Ok((a.0 + b.0, a.1 + b.1)))
    });
    bar.finish_and_clear();

    // Close even when a producer failed so the consumer can finish.
    stream.close();
    let consumed = consumer
        .join()
        .map_err(|_| anyhow!("HSP consumer thread panicked"))?;
    let (lists_written, hsps_written) =
        produced.context("Search worker failed to write to the HSP stream")?;
    let (lists_read, hsps_read) = consumed?;
    HspStream::free(stream);

    let summary = SearchSummary {
        lists_written,
        hsps_written,
        lists_read,
        hsps_read,
    };
    info!(
        "search finished: wrote {} lists ({} HSPs), read {} lists ({} HSPs)",
        summary.lists_written, summary.hsps_written, summary.lists_read, summary.hsps_read
    );
    Ok(summary)
}
