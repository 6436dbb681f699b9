//! Transfer table: offset → signed pc delta.

use std::fmt;

use rustc_hash::FxHashMap;
use xfer_isa::{Pc, PcDelta, apply_delta};

/// Control transfers of one function body.
///
/// Keys are the offsets the interpreter reads a branch decision from; values
/// are the deltas to add to its program counter when the transfer is taken.
/// The table is never mutated once the pass has produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferTable {
    deltas: FxHashMap<Pc, PcDelta>,
}

impl TransferTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the delta for `pc`. Each patch site is written once.
    pub(crate) fn insert(&mut self, pc: Pc, delta: PcDelta) {
        let previous = self.deltas.insert(pc, delta);
        debug_assert!(previous.is_none(), "control transfer at {pc} resolved twice");
    }

    /// Delta for the control instruction at `pc`.
    #[must_use]
    pub fn get(&self, pc: Pc) -> Option<PcDelta> {
        self.deltas.get(&pc).copied()
    }

    /// Absolute target of the transfer read at `pc`.
    #[must_use]
    pub fn target(&self, pc: Pc) -> Option<Pc> {
        self.get(pc).and_then(|delta| apply_delta(pc, delta))
    }

    #[must_use]
    pub fn contains(&self, pc: Pc) -> bool {
        self.deltas.contains_key(&pc)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Iterate over `(pc, delta)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Pc, PcDelta)> + '_ {
        self.deltas.iter().map(|(&pc, &delta)| (pc, delta))
    }

    /// Entries sorted by offset.
    #[must_use]
    pub fn sorted(&self) -> Vec<(Pc, PcDelta)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|&(pc, _)| pc);
        entries
    }
}

impl FromIterator<(Pc, PcDelta)> for TransferTable {
    fn from_iter<I: IntoIterator<Item = (Pc, PcDelta)>>(iter: I) -> Self {
        Self {
            deltas: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for TransferTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pc, delta) in self.sorted() {
            writeln!(f, "@{pc} pcdiff = {delta}")?;
        }
        Ok(())
    }
}
