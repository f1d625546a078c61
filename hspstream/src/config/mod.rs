//! Stream configuration
//!
//! - `stream_options` - stream kind, read order and tuning knobs

pub mod stream_options;

pub use stream_options::{ReadOrder, StreamKind, StreamOptions};
