//! Within-group conflict resolution.
//!
//! Each row not yet absorbed seeds an accumulator. Every later row that agrees
//! with the accumulator on all fields both hold is absorbed: its values fill the
//! accumulator's gaps, never overwrite them. A disagreement with any later row
//! voids the whole accumulation and the seed is emitted unmodified, but rows
//! absorbed before the disagreement stay consumed.
//!
//! Compatibility is judged against the growing accumulator, so the outcome
//! depends on row order: the operation is neither commutative nor associative.

use crate::table::{Record, Value};

/// Output of resolving one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub rows: Vec<Record>,
    /// Seed row (group-local index) behind each output row.
    pub(crate) seeds: Vec<usize>,
    /// Rows absorbed into an earlier seed.
    pub absorbed: usize,
    /// Seeds whose accumulation was voided by a disagreement.
    pub conflicted: usize,
    /// Rows first consumed by a seed that was later voided. Their values only
    /// survive if a later seed re-absorbed them.
    pub voided: usize,
}

/// Per-seed scan state: the accumulated row and whether any later row disagreed.
struct ScanState {
    accumulator: Record,
    conflict: bool,
}

impl ScanState {
    fn seed(row: &[Value]) -> Self {
        Self { accumulator: row.to_vec(), conflict: false }
    }

    /// True when no field is non-missing in both with different values.
    fn agrees_with(&self, other: &[Value]) -> bool {
        self.accumulator.iter().zip(other).all(|(a, b)| match (a, b) {
            (Some(x), Some(y)) => x == y,
            _ => true,
        })
    }

    fn absorb(&mut self, other: &[Value]) {
        for (a, b) in self.accumulator.iter_mut().zip(other) {
            if a.is_none() {
                *a = *b;
            }
        }
    }
}

/// Resolve one group of same-schema rows.
pub fn resolve_conflicts<R: AsRef<[Value]>>(rows: &[R]) -> Resolution {
    let n = rows.len();
    let mut consumed = vec![false; n];
    let mut out = Resolution::default();

    for i in 0..n {
        if consumed[i] {
            continue;
        }
        let seed = rows[i].as_ref();
        let mut state = ScanState::seed(seed);
        let mut newly_consumed = 0;

        for (j, row) in rows.iter().enumerate().skip(i + 1) {
            let row = row.as_ref();
            if !state.agrees_with(row) {
                state.conflict = true;
                continue;
            }
            state.absorb(row);
            if !consumed[j] {
                consumed[j] = true;
                newly_consumed += 1;
            }
            consumed[i] = true;
        }

        out.absorbed += newly_consumed;
        if state.conflict {
            out.conflicted += 1;
            out.voided += newly_consumed;
            out.rows.push(seed.to_vec());
        } else {
            out.rows.push(state.accumulator);
        }
        out.seeds.push(i);
    }
    out
}
