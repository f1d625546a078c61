//! Build a ready stream from [`StreamOptions`].

use log::debug;

use crate::common::HspList;
use crate::config::{StreamKind, StreamOptions};
use crate::core::blast_hspstream::HspStreamHandle;
use crate::core::hsp_writer::{EvalueWriter, MaxTargetsWriter};
use crate::core::hspstream_collector::{new_collector_stream, CollectorOptions};
use crate::core::hspstream_queue::{new_queue_stream, QueueOptions};
use crate::error::Result;

pub fn build_stream(options: &StreamOptions) -> Result<HspStreamHandle<HspList>> {
    debug!("building HSP stream: {:?}", options);
    match options.kind {
        StreamKind::Queue => new_queue_stream(QueueOptions {
            capacity: options.capacity.map(|c| c.max(1)),
            write_timeout: options.write_timeout,
        }),
        StreamKind::Collector => {
            let mut collector = CollectorOptions::new(options.read_order).with_writer(EvalueWriter {
                max_evalue: options.evalue,
            });
            if options.hitlist_size > 0 {
                collector = collector.with_writer(MaxTargetsWriter {
                    hitlist_size: options.hitlist_size,
                });
            }
            new_collector_stream(collector)
        }
    }
}
