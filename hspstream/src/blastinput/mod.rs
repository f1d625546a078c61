//! Command-line argument handling
//!
//! - `blast_args` - shared defaults
//! - `stream_args` - stream selection and tuning, flattened into commands
//! - `simulate_args` - arguments of the `simulate` command

pub mod blast_args;
pub mod simulate_args;
pub mod stream_args;
