//! The standard instruction set, read with `wasmparser`.

use wasmparser::{BinaryReader, Operator};

use super::InstructionSet;
use crate::opcodes::{
    OP_BLOCK, OP_BR, OP_BR_IF, OP_BR_TABLE, OP_CALL, OP_CALL_INDIRECT, OP_DROP, OP_ELSE, OP_END,
    OP_I32_CONST, OP_I64_CONST, OP_IF, OP_LOCAL_GET, OP_LOCAL_SET, OP_LOOP, OP_NOP, OP_RETURN,
    OP_RETURN_CALL, OP_RETURN_CALL_INDIRECT, OP_SELECT, OP_UNREACHABLE, is_prefix,
};
use crate::{BlockType, DecodeError, DecodedInstr, InstrKind, OpId, Pc, Result};

/// Every operator `wasmparser` reads, with all proposals enabled.
///
/// Exception handling and the typed-reference branches (`try`, `delegate`,
/// `br_on_null`, `br_on_cast`, ...) carry labels the pass does not track, so
/// they are left to later sets and fail as unknown opcodes by default.
pub struct WasmSet;

impl WasmSet {
    fn opid(code: &[u8], pc: Pc, byte: u8) -> Result<OpId> {
        if !is_prefix(byte) {
            return Ok(OpId::new(byte));
        }
        let mut reader = BinaryReader::new(&code[pc + 1..], pc + 1);
        Ok(OpId::prefixed(byte, reader.read_var_u32()?))
    }
}

/// Control-flow class of a parsed operator, or `None` for unsupported labels.
fn classify(op: Operator<'_>, pc: Pc) -> Result<Option<InstrKind>> {
    let block_type = |ty: wasmparser::BlockType| {
        BlockType::from_wasm(ty).ok_or(DecodeError::UnsupportedBlockType { pc })
    };
    let kind = match op {
        Operator::Block { blockty } => InstrKind::Block(block_type(blockty)?),
        Operator::Loop { blockty } => InstrKind::Loop(block_type(blockty)?),
        Operator::If { blockty } => InstrKind::If(block_type(blockty)?),
        Operator::Else => InstrKind::Else,
        Operator::End => InstrKind::End,
        Operator::Br { relative_depth } => InstrKind::Br {
            depth: relative_depth,
        },
        Operator::BrIf { relative_depth } => InstrKind::BrIf {
            depth: relative_depth,
        },
        Operator::BrTable { targets: table } => InstrKind::BrTable {
            targets: table
                .targets()
                .collect::<std::result::Result<Box<[u32]>, _>>()?,
            default: table.default(),
        },
        Operator::Try { .. }
        | Operator::TryTable { .. }
        | Operator::Catch { .. }
        | Operator::CatchAll
        | Operator::Delegate { .. }
        | Operator::Rethrow { .. }
        | Operator::BrOnNull { .. }
        | Operator::BrOnNonNull { .. }
        | Operator::BrOnCast { .. }
        | Operator::BrOnCastFail { .. } => return Ok(None),
        _ => InstrKind::Other,
    };
    Ok(Some(kind))
}

impl InstructionSet for WasmSet {
    fn name(&self) -> &'static str {
        "wasm"
    }

    fn decode(&self, code: &[u8], pc: Pc) -> Result<Option<DecodedInstr>> {
        let Some(&byte) = code.get(pc) else {
            return Ok(None);
        };
        let mut reader = BinaryReader::new(&code[pc..], pc);
        let op = match reader.read_operator() {
            Ok(op) => op,
            // Rejected at the opcode byte itself
            Err(err) if err.offset() == pc => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let size = reader.original_position() - pc;

        let Some(kind) = classify(op, pc)? else {
            return Ok(None);
        };
        Ok(Some(DecodedInstr::new(Self::opid(code, pc, byte)?, pc, size, kind)))
    }

    fn mnemonic(&self, opid: OpId) -> Option<&'static str> {
        if opid.sub.is_some() {
            return None;
        }
        Some(match opid.byte {
            OP_UNREACHABLE => "unreachable",
            OP_NOP => "nop",
            OP_BLOCK => "block",
            OP_LOOP => "loop",
            OP_IF => "if",
            OP_ELSE => "else",
            OP_END => "end",
            OP_BR => "br",
            OP_BR_IF => "br_if",
            OP_BR_TABLE => "br_table",
            OP_RETURN => "return",
            OP_CALL => "call",
            OP_CALL_INDIRECT => "call_indirect",
            OP_RETURN_CALL => "return_call",
            OP_RETURN_CALL_INDIRECT => "return_call_indirect",
            OP_DROP => "drop",
            OP_SELECT => "select",
            OP_LOCAL_GET => "local.get",
            OP_LOCAL_SET => "local.set",
            OP_I32_CONST => "i32.const",
            OP_I64_CONST => "i64.const",
            _ => return None,
        })
    }
}
