//! Post-pass consistency check of a transfer table against its body.

use rustc_hash::FxHashSet;
use tracing::trace;
use xfer_isa::{CompositeDecoder, InstrKind, Pc, apply_delta};

use crate::{Result, TransferError, TransferTable};

/// Check that `table` is exactly the table `code` needs.
///
/// Every offset a control instruction reads must have an entry, no other key
/// may be present, and every entry must land on an instruction boundary or
/// one past the last byte.
///
/// # Errors
/// `MissingTransfer`, `UnexpectedKey` or `InvalidTarget` for the first
/// inconsistency found; `Decode` if `code` does not decode.
pub fn verify_targets(code: &[u8], decoder: &CompositeDecoder, table: &TransferTable) -> Result<()> {
    let mut boundaries = FxHashSet::default();
    let mut read_sites = Vec::new();

    for instr in decoder.instructions(code) {
        let instr = instr?;
        boundaries.insert(instr.pc);
        match &instr.kind {
            InstrKind::If(_) | InstrKind::Else | InstrKind::Br { .. } | InstrKind::BrIf { .. } => {
                read_sites.push(instr.pc);
            }
            InstrKind::BrTable { .. } => {
                let count = instr.label_depths().count();
                read_sites.extend(instr.pc..instr.pc + count);
            }
            InstrKind::Block(_) | InstrKind::Loop(_) | InstrKind::End | InstrKind::Other => {}
        }
    }
    boundaries.insert(code.len());

    if let Some(&pc) = read_sites.iter().find(|&&pc| !table.contains(pc)) {
        return Err(TransferError::MissingTransfer { pc });
    }

    let expected: FxHashSet<Pc> = read_sites.into_iter().collect();
    for (key, delta) in table.sorted() {
        if !expected.contains(&key) {
            return Err(TransferError::UnexpectedKey { key });
        }
        let lands = apply_delta(key, delta).is_some_and(|target| boundaries.contains(&target));
        if !lands {
            return Err(TransferError::InvalidTarget { key, delta });
        }
    }

    trace!(entries = table.len(), "control transfer targets verified");
    Ok(())
}
