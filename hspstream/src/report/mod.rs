//! Result reporting
//!
//! - `outfmt6` - tabular output of delivered HSP lists

pub mod outfmt6;
