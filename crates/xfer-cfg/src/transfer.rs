//! Control-transfer computation.
//!
//! A single forward pass over the decoded instructions of one body. Every
//! `block`/`loop`/`if` pushes a scope; branches either resolve immediately
//! (loop labels point backwards at the `loop` opcode) or register their offset
//! in the target scope's pending list, which the matching `end` backpatches.

use tracing::{debug, debug_span, trace};
use xfer_isa::{CompositeDecoder, DecodedInstr, InstrKind, Pc, PcDelta, pc_delta};

use crate::scope::{ControlScope, LabelTarget, ScopeKind, ScopeStack};
use crate::{MalformedReason, Result, TransferConfig, TransferError, TransferTable, verify_targets};

/// Compute the transfer table of `code` with the standard decoder and default
/// configuration.
///
/// The buffer must close the implicit outer scope with a final `end`, as every
/// wasm function body does.
///
/// # Errors
/// `MalformedControlFlow` for unbalanced nesting, `InvalidBranchDepth` for a
/// branch to a scope that is not open, `Decode` for an undecodable stream.
pub fn compute(code: &[u8]) -> Result<TransferTable> {
    compute_with(code, &CompositeDecoder::standard(), &TransferConfig::default())
}

/// Compute the transfer table of `code` with an explicit decoder and config.
///
/// # Errors
/// See [`compute`]; additionally `NestingTooDeep` when the configured limit is
/// exceeded and the verifier errors when `verify_targets` is enabled.
pub fn compute_with(
    code: &[u8],
    decoder: &CompositeDecoder,
    config: &TransferConfig,
) -> Result<TransferTable> {
    let _span = debug_span!("control_transfers", len = code.len()).entered();

    let result = TransferPass::new(config).run(code, decoder);
    let table = match result {
        Ok(table) => table,
        Err(err) => {
            debug!(pc = err.pc(), %err, "control transfer analysis failed");
            return Err(err);
        }
    };

    if config.verify_targets {
        verify_targets(code, decoder, &table)?;
    }
    Ok(table)
}

/// State of one pass: the scope stack and the table being filled.
struct TransferPass<'a> {
    config: &'a TransferConfig,
    stack: ScopeStack,
    table: TransferTable,
}

impl<'a> TransferPass<'a> {
    fn new(config: &'a TransferConfig) -> Self {
        let mut stack = ScopeStack::new();
        // Implicit scope wrapping the whole body, closed by its final `end`
        stack.push(ControlScope::new(ScopeKind::Block, 0));
        Self {
            config,
            stack,
            table: TransferTable::new(),
        }
    }

    fn run(mut self, code: &[u8], decoder: &CompositeDecoder) -> Result<TransferTable> {
        let mut pc = 0;
        while pc < code.len() {
            let instr = decoder.decode(code, pc)?;
            trace!(pc, depth = self.stack.len(), instr = %decoder.disasm(&instr));
            if self.stack.is_empty() {
                let reason = if instr.kind == InstrKind::End {
                    MalformedReason::UnmatchedEnd
                } else {
                    MalformedReason::TrailingCode
                };
                return Err(TransferError::malformed(pc, reason));
            }
            self.step(&instr)?;
            pc = instr.next_pc();
        }

        if !self.stack.is_empty() {
            let open = self.stack.len();
            return Err(TransferError::malformed(
                code.len(),
                MalformedReason::UnclosedScopes { open },
            ));
        }

        debug!(
            entries = self.table.len(),
            max_depth = self.stack.high_water(),
            "control transfers computed"
        );
        Ok(self.table)
    }

    fn step(&mut self, instr: &DecodedInstr) -> Result<()> {
        let pc = instr.pc;
        match &instr.kind {
            InstrKind::Block(_) => self.open(ScopeKind::Block, pc)?,
            InstrKind::Loop(_) => self.open(ScopeKind::Loop, pc)?,
            InstrKind::If(_) => self.open(ScopeKind::IfNoElse, pc)?,
            InstrKind::Else => self.on_else(pc)?,
            InstrKind::End => self.on_end(pc)?,
            InstrKind::Br { depth } | InstrKind::BrIf { depth } => self.branch(pc, pc, *depth)?,
            InstrKind::BrTable { .. } => {
                // One patch site per entry, keyed by consecutive offsets from the opcode
                for (i, depth) in instr.label_depths().enumerate() {
                    self.branch(pc, pc + i, depth)?;
                }
            }
            InstrKind::Other => {}
        }
        Ok(())
    }

    fn open(&mut self, kind: ScopeKind, pc: Pc) -> Result<()> {
        let limit = self.config.max_nesting_depth;
        if self.stack.len() >= limit {
            return Err(TransferError::NestingTooDeep { pc, limit });
        }
        self.stack.push(ControlScope::new(kind, pc));
        Ok(())
    }

    fn on_else(&mut self, else_pc: Pc) -> Result<()> {
        let scope = self
            .stack
            .top_mut()
            .ok_or_else(|| TransferError::malformed(else_pc, MalformedReason::ElseWithoutIf))?;
        match scope.kind {
            ScopeKind::IfNoElse => {}
            ScopeKind::IfWithElse { .. } => {
                return Err(TransferError::malformed(else_pc, MalformedReason::DuplicateElse));
            }
            ScopeKind::Block | ScopeKind::Loop => {
                return Err(TransferError::malformed(else_pc, MalformedReason::ElseWithoutIf));
            }
        }

        // The false edge of the `if` enters the else arm, one past the `else`
        let if_pc = scope.start_pc;
        scope.kind = ScopeKind::IfWithElse { else_pc };
        // The end of the then arm skips the else arm
        scope.pending.push(else_pc);
        self.resolve(if_pc, pc_delta(if_pc, else_pc + 1));
        Ok(())
    }

    fn on_end(&mut self, end_pc: Pc) -> Result<()> {
        let scope = self
            .stack
            .pop()
            .ok_or_else(|| TransferError::malformed(end_pc, MalformedReason::UnmatchedEnd))?;
        for (pc, delta) in scope.close(end_pc) {
            self.resolve(pc, delta);
        }
        Ok(())
    }

    /// Register or resolve the transfer read at `key` for a branch at `pc`.
    fn branch(&mut self, pc: Pc, key: Pc, depth: u32) -> Result<()> {
        let open = self.stack.len();
        let scope = usize::try_from(depth)
            .ok()
            .and_then(|depth| self.stack.get_mut(depth))
            .ok_or(TransferError::InvalidBranchDepth { pc, depth, open })?;
        match scope.label_target() {
            LabelTarget::Backward(target) => self.resolve(key, pc_delta(key, target)),
            LabelTarget::Forward => scope.pending.push(key),
        }
        Ok(())
    }

    fn resolve(&mut self, pc: Pc, delta: PcDelta) {
        trace!(pc, delta, "resolved control transfer");
        self.table.insert(pc, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfer_isa::{
        BlockType, CodeBuilder, DecodeError, InstructionSet, OP_BLOCK, OP_ELSE, OP_END, OP_IF,
        OP_LOOP, OpId,
    };

    /// Claims `0xFF` without consuming it.
    struct Stall;

    impl InstructionSet for Stall {
        fn name(&self) -> &'static str {
            "stall"
        }

        fn decode(&self, code: &[u8], pc: Pc) -> xfer_isa::Result<Option<DecodedInstr>> {
            Ok((code[pc] == 0xFF)
                .then(|| DecodedInstr::new(OpId::new(0xFF), pc, 0, InstrKind::Other)))
        }

        fn mnemonic(&self, _opid: OpId) -> Option<&'static str> {
            None
        }
    }

    fn table(entries: &[(Pc, PcDelta)]) -> TransferTable {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_nested_blocks() {
        // block; block; br 1; end; end; end
        let code = CodeBuilder::new()
            .begin_block(BlockType::Empty)
            .begin_block(BlockType::Empty)
            .br(1)
            .end()
            .end()
            .end()
            .finish();
        // br at 4 targets the outer block's end at 7, landing at 8
        assert_eq!(compute(&code).unwrap(), table(&[(4, 4)]));
    }

    #[test]
    fn test_br_if_in_loop_and_block() {
        // block; loop; br_if 0; br_if 1; end; end; end
        let code = CodeBuilder::new()
            .begin_block(BlockType::Empty)
            .begin_loop(BlockType::Empty)
            .br_if(0)
            .br_if(1)
            .end()
            .end()
            .end()
            .finish();
        assert_eq!(compute(&code).unwrap(), table(&[(4, -2), (6, 4)]));
    }

    #[test]
    fn test_branch_to_implicit_scope() {
        // br 0 at top level exits the body: lands one past the final end
        let code = CodeBuilder::new().br(0).end().finish();
        assert_eq!(compute(&code).unwrap(), table(&[(0, 3)]));
    }

    #[test]
    fn test_missing_end() {
        let code = [OP_BLOCK, 0x40, OP_END];
        assert_eq!(
            compute(&code),
            Err(TransferError::malformed(3, MalformedReason::UnclosedScopes { open: 1 }))
        );
    }

    #[test]
    fn test_empty_code_is_unclosed() {
        assert_eq!(
            compute(&[]),
            Err(TransferError::malformed(0, MalformedReason::UnclosedScopes { open: 1 }))
        );
    }

    #[test]
    fn test_extra_end() {
        let code = [OP_END, OP_END];
        assert_eq!(
            compute(&code),
            Err(TransferError::malformed(1, MalformedReason::UnmatchedEnd))
        );
    }

    #[test]
    fn test_trailing_code() {
        let code = [OP_END, 0x01];
        assert_eq!(
            compute(&code),
            Err(TransferError::malformed(1, MalformedReason::TrailingCode))
        );
    }

    #[test]
    fn test_else_outside_if() {
        let code = [OP_LOOP, 0x40, OP_ELSE, OP_END, OP_END];
        assert_eq!(
            compute(&code),
            Err(TransferError::malformed(2, MalformedReason::ElseWithoutIf))
        );
    }

    #[test]
    fn test_else_at_top_level() {
        let code = [OP_ELSE, OP_END];
        assert_eq!(
            compute(&code),
            Err(TransferError::malformed(0, MalformedReason::ElseWithoutIf))
        );
    }

    #[test]
    fn test_duplicate_else() {
        let code = [0x41, 0x00, OP_IF, 0x40, OP_ELSE, OP_ELSE, OP_END, OP_END];
        assert_eq!(
            compute(&code),
            Err(TransferError::malformed(5, MalformedReason::DuplicateElse))
        );
    }

    #[test]
    fn test_branch_depth_out_of_range() {
        // Only the implicit scope and one block are open
        let code = CodeBuilder::new()
            .begin_block(BlockType::Empty)
            .br(2)
            .end()
            .end()
            .finish();
        assert_eq!(
            compute(&code),
            Err(TransferError::InvalidBranchDepth { pc: 2, depth: 2, open: 2 })
        );
    }

    #[test]
    fn test_br_table_entry_out_of_range() {
        let code = CodeBuilder::new()
            .i32_const(0)
            .br_table(&[0, 5], 0)
            .end()
            .finish();
        assert_eq!(
            compute(&code),
            Err(TransferError::InvalidBranchDepth { pc: 2, depth: 5, open: 1 })
        );
    }

    #[test]
    fn test_nesting_limit() {
        let code = [OP_BLOCK, 0x40, OP_BLOCK, 0x40, OP_END, OP_END, OP_END];
        let config = TransferConfig::default().with_max_nesting_depth(2);
        let decoder = CompositeDecoder::standard();
        assert_eq!(
            compute_with(&code, &decoder, &config),
            Err(TransferError::NestingTooDeep { pc: 2, limit: 2 })
        );
        let config = config.with_max_nesting_depth(3);
        assert!(compute_with(&code, &decoder, &config).unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_propagates() {
        // i32.const with a truncated immediate
        let code = [OP_IF, 0x40, 0x41];
        assert!(matches!(compute(&code), Err(TransferError::Decode(_))));
    }

    #[test]
    fn test_verified_compute() {
        let code = CodeBuilder::new()
            .i32_const(1)
            .begin_if(BlockType::Empty)
            .br(0)
            .begin_else()
            .nop()
            .end()
            .end()
            .finish();
        let config = TransferConfig::default().with_verify_targets(true);
        let table = compute_with(&code, &CompositeDecoder::standard(), &config).unwrap();
        assert_eq!(table, table_of_if_else());
    }

    fn table_of_if_else() -> TransferTable {
        // if@2, br@4, else@6, nop@7, end@8
        table(&[(2, 5), (4, 5), (6, 3)])
    }

    #[test]
    fn test_if_entry_survives_inner_scopes() {
        // if; block; end; end (no else): the if lands on its own end
        let code = [0x41, 0x00, OP_IF, 0x40, OP_BLOCK, 0x40, OP_END, OP_END, OP_END];
        assert_eq!(compute(&code).unwrap(), table(&[(2, 5)]));
    }

    #[test]
    fn test_end_with_no_open_scope() {
        let config = TransferConfig::default();
        let mut pass = TransferPass::new(&config);
        assert!(pass.stack.pop().is_some());
        assert_eq!(
            pass.on_end(4),
            Err(TransferError::malformed(4, MalformedReason::UnmatchedEnd))
        );
    }

    #[test]
    fn test_zero_width_instruction_stops_the_pass() {
        let decoder = CompositeDecoder::standard().with_set(Stall);
        let code = [OP_BLOCK, 0x40, 0xFF, OP_END, OP_END];
        assert_eq!(
            compute_with(&code, &decoder, &TransferConfig::default()),
            Err(TransferError::Decode(DecodeError::ZeroWidth { pc: 2, set: "stall" }))
        );
    }
}
