//! Decoded instruction model.

use std::fmt;

use crate::{BlockType, Pc};

/// Opcode identifier: a primary byte plus the sub-opcode for prefixed groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpId {
    /// First byte of the instruction.
    pub byte: u8,
    /// LEB128 sub-opcode following a prefix byte (`0xFC`, ...).
    pub sub: Option<u32>,
}

impl OpId {
    #[must_use]
    pub const fn new(byte: u8) -> Self {
        Self { byte, sub: None }
    }

    #[must_use]
    pub const fn prefixed(byte: u8, sub: u32) -> Self {
        Self { byte, sub: Some(sub) }
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.byte)?;
        if let Some(sub) = self.sub {
            write!(f, " {sub}")?;
        }
        Ok(())
    }
}

/// What an instruction means to the control-transfer pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstrKind {
    Block(BlockType),
    Loop(BlockType),
    If(BlockType),
    Else,
    End,
    /// Unconditional branch to the label at `depth`.
    Br { depth: u32 },
    /// Conditional branch to the label at `depth`.
    BrIf { depth: u32 },
    /// Indexed branch. `targets` are the explicit entries; `default` is taken
    /// when the index is out of range.
    BrTable { targets: Box<[u32]>, default: u32 },
    /// Everything that never transfers control within the body.
    Other,
}

impl InstrKind {
    /// Whether this instruction opens, splits or closes a control scope.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Block(_) | Self::Loop(_) | Self::If(_) | Self::Else | Self::End
        )
    }

    /// Whether this instruction is a branch (`br`, `br_if`, `br_table`).
    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::Br { .. } | Self::BrIf { .. } | Self::BrTable { .. })
    }
}

/// Decoded instruction with its position and size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedInstr {
    /// Opcode identifier.
    pub opid: OpId,
    /// Offset of the first opcode byte.
    pub pc: Pc,
    /// Total size in bytes, operands included.
    pub size: usize,
    /// Control-flow classification.
    pub kind: InstrKind,
}

impl DecodedInstr {
    #[must_use]
    pub const fn new(opid: OpId, pc: Pc, size: usize, kind: InstrKind) -> Self {
        Self {
            opid,
            pc,
            size,
            kind,
        }
    }

    /// Offset of the next instruction.
    #[must_use]
    pub const fn next_pc(&self) -> Pc {
        self.pc + self.size
    }

    /// Label depths read by a branch, in encoding order.
    ///
    /// For `br_table` this is every explicit target followed by the default;
    /// non-branches yield nothing.
    pub fn label_depths(&self) -> impl Iterator<Item = u32> + '_ {
        const NO_LABELS: &[u32] = &[];
        let (single, table): (Option<u32>, &[u32]) = match &self.kind {
            InstrKind::Br { depth } | InstrKind::BrIf { depth } => (Some(*depth), NO_LABELS),
            InstrKind::BrTable { targets, default } => (Some(*default), &targets[..]),
            _ => (None, NO_LABELS),
        };
        table.iter().copied().chain(single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_depths_br_table_default_last() {
        let instr = DecodedInstr::new(
            OpId::new(0x0E),
            4,
            5,
            InstrKind::BrTable {
                targets: vec![0, 1, 2].into_boxed_slice(),
                default: 7,
            },
        );
        assert_eq!(instr.label_depths().collect::<Vec<_>>(), [0, 1, 2, 7]);
        assert_eq!(instr.next_pc(), 9);
    }

    #[test]
    fn test_label_depths_non_branch() {
        let instr = DecodedInstr::new(OpId::new(0x01), 0, 1, InstrKind::Other);
        assert_eq!(instr.label_depths().count(), 0);
        assert!(!instr.kind.is_branch());
        assert!(InstrKind::Else.is_structural());
    }

    #[test]
    fn test_opid_display() {
        assert_eq!(OpId::new(0x6A).to_string(), "0x6a");
        assert_eq!(OpId::prefixed(0xFC, 10).to_string(), "0xfc 10");
    }
}
