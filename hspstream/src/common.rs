use std::cmp::Ordering;

/// A single scored local alignment between a query and a subject.
///
/// Coordinates are 0-based and inclusive; the stream never interprets them
/// beyond ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Hsp {
    /// Raw alignment score
    pub score: i32,
    pub bit_score: f64,
    pub e_value: f64,
    pub q_start: usize,
    pub q_end: usize,
    pub s_start: usize,
    pub s_end: usize,
}

impl Hsp {
    pub fn new(score: i32, e_value: f64, q_range: (usize, usize), s_range: (usize, usize)) -> Self {
        Self {
            score,
            bit_score: 0.0,
            e_value,
            q_start: q_range.0,
            q_end: q_range.1,
            s_start: s_range.0,
            s_end: s_range.1,
        }
    }

    pub fn with_bit_score(mut self, bit_score: f64) -> Self {
        self.bit_score = bit_score;
        self
    }
}

/// All HSPs found for one query against one subject (BlastHSPList).
///
/// This is the unit of work producers hand to a stream and consumers get
/// back from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HspList {
    /// Index of the query in input order
    pub query_index: u32,
    /// Ordinal id of the subject sequence
    pub oid: u32,
    pub hsps: Vec<Hsp>,
}

impl HspList {
    pub fn new(query_index: u32, oid: u32) -> Self {
        Self {
            query_index,
            oid,
            hsps: Vec::new(),
        }
    }

    pub fn with_hsps(query_index: u32, oid: u32, hsps: Vec<Hsp>) -> Self {
        Self {
            query_index,
            oid,
            hsps,
        }
    }

    pub fn push(&mut self, hsp: Hsp) {
        self.hsps.push(hsp);
    }

    pub fn is_empty(&self) -> bool {
        self.hsps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hsps.len()
    }

    /// Smallest e-value in the list, `f64::MAX` when empty. NaN only wins
    /// when every e-value is NaN.
    pub fn best_evalue(&self) -> f64 {
        self.hsps
            .iter()
            .map(|h| h.e_value)
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or(f64::MAX)
    }

    /// Highest raw score in the list, 0 when empty.
    pub fn best_score(&self) -> i32 {
        self.hsps.iter().map(|h| h.score).max().unwrap_or(0)
    }

    pub fn sort_by_score(&mut self) {
        self.hsps.sort_by(score_compare_hsps);
    }

    /// Move every HSP of `other` into this list. `other` must describe the
    /// same query/subject pair.
    pub fn absorb(&mut self, mut other: HspList) {
        debug_assert_eq!(self.query_index, other.query_index);
        debug_assert_eq!(self.oid, other.oid);
        if self.hsps.is_empty() {
            self.hsps = other.hsps;
        } else {
            self.hsps.append(&mut other.hsps);
        }
    }
}

// =============================================================================
// Comparators used to order stream output
// =============================================================================

/// Compare two e-values, treating both as equal if they're close enough to zero.
///
/// Total order: NaN sorts after every finite e-value and +inf.
#[inline]
pub fn evalue_comp(evalue1: f64, evalue2: f64) -> Ordering {
    const EPSILON: f64 = 1.0e-180;
    if evalue1 < EPSILON && evalue2 < EPSILON {
        Ordering::Equal
    } else {
        evalue1.total_cmp(&evalue2)
    }
}

/// Order HSPs within a list.
///
/// Order: score DESC → s_start ASC → s_end DESC → q_start ASC → q_end DESC
pub fn score_compare_hsps(a: &Hsp, b: &Hsp) -> Ordering {
    match b.score.cmp(&a.score) {
        Ordering::Equal => {}
        ord => return ord,
    }
    match a.s_start.cmp(&b.s_start) {
        Ordering::Equal => {}
        ord => return ord,
    }
    match b.s_end.cmp(&a.s_end) {
        Ordering::Equal => {}
        ord => return ord,
    }
    match a.q_start.cmp(&b.q_start) {
        Ordering::Equal => {}
        ord => return ord,
    }
    b.q_end.cmp(&a.q_end)
}

/// Order subject lists within a query.
///
/// Order: empty lists last → best_evalue ASC → best_score DESC → oid DESC
pub fn evalue_compare_hsp_lists(a: &HspList, b: &HspList) -> Ordering {
    if a.is_empty() && b.is_empty() {
        return Ordering::Equal;
    } else if a.is_empty() {
        return Ordering::Greater;
    } else if b.is_empty() {
        return Ordering::Less;
    }

    match evalue_comp(a.best_evalue(), b.best_evalue()) {
        Ordering::Equal => {}
        ord => return ord,
    }

    match b.best_score().cmp(&a.best_score()) {
        Ordering::Equal => {}
        ord => return ord,
    }

    b.oid.cmp(&a.oid)
}
