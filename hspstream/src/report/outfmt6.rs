//! Tabular output for HSP lists read from a stream.
//!
//! One line per HSP, tab separated:
//! `qseqid sseqid score qstart qend sstart send evalue bitscore`
//! with 1-based inclusive coordinates.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::common::HspList;

/// Open `out_path`, or stdout when `None`.
pub fn open_output(out_path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    let writer: Box<dyn Write + Send> = match out_path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(writer)
}

/// Write every HSP of `list`. Query and subject are labelled by index.
pub fn write_hsp_list<W: Write + ?Sized>(writer: &mut W, list: &HspList) -> io::Result<()> {
    for hsp in &list.hsps {
        writeln!(
            writer,
            "query_{}\tsubject_{}\t{}\t{}\t{}\t{}\t{}\t{:.1e}\t{:.1}",
            list.query_index,
            list.oid,
            hsp.score,
            hsp.q_start + 1,
            hsp.q_end + 1,
            hsp.s_start + 1,
            hsp.s_end + 1,
            hsp.e_value,
            hsp.bit_score
        )?;
    }
    Ok(())
}
