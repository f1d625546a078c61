//! HSP writers
//!
//! Hooks the collector stream runs over each query's results when it is
//! closed, before anything is read (BlastHSPWriter).

use crate::common::{evalue_compare_hsp_lists, HspList};

/// Post-processing step applied to all subject lists of one query.
pub trait HspWriter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrite `lists` in place. Lists left empty are dropped by the caller.
    fn run(&self, query_index: u32, lists: &mut Vec<HspList>);
}

/// Drop HSPs whose e-value exceeds `max_evalue`.
#[derive(Debug, Clone, Copy)]
pub struct EvalueWriter {
    pub max_evalue: f64,
}

impl HspWriter for EvalueWriter {
    fn name(&self) -> &'static str {
        "evalue"
    }

    fn run(&self, _query_index: u32, lists: &mut Vec<HspList>) {
        for list in lists.iter_mut() {
            list.hsps.retain(|h| h.e_value <= self.max_evalue);
        }
        lists.retain(|l| !l.is_empty());
    }
}

/// Keep the best `hitlist_size` subjects of each query.
#[derive(Debug, Clone, Copy)]
pub struct MaxTargetsWriter {
    pub hitlist_size: usize,
}

impl HspWriter for MaxTargetsWriter {
    fn name(&self) -> &'static str {
        "max_target_seqs"
    }

    fn run(&self, _query_index: u32, lists: &mut Vec<HspList>) {
        if lists.len() <= self.hitlist_size {
            return;
        }
        lists.sort_by(evalue_compare_hsp_lists);
        lists.truncate(self.hitlist_size);
    }
}
