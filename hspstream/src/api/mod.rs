//! High-level entry points
//!
//! - `stream_factory` - build a stream from configuration
//! - `local_search` - drive producers and a consumer through a stream

pub mod local_search;
pub mod stream_factory;

pub use local_search::{run, SearchSummary};
pub use stream_factory::build_stream;
