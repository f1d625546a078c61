pub mod common;
pub mod error;

pub mod api;
pub mod blastinput;
pub mod config;
pub mod core;
pub mod report;

pub use crate::common::{Hsp, HspList};
pub use crate::core::blast_hspstream::{
    hsp_stream_close, hsp_stream_free, hsp_stream_new, hsp_stream_read, hsp_stream_write,
    HspStream, HspStreamHandle, HspStreamMethods, Method, MethodRole, NewInfo, Status,
    StreamBuilder, StreamContext, StreamState,
};
pub use crate::error::StreamError;
