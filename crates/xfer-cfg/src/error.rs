//! Control-transfer errors.

use thiserror::Error;
use xfer_isa::{DecodeError, Pc, PcDelta};

/// Why a body's nesting structure is malformed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("{open} scope(s) still open at end of code")]
    UnclosedScopes { open: usize },
    #[error("`end` without a matching opener")]
    UnmatchedEnd,
    #[error("`else` without a matching `if`")]
    ElseWithoutIf,
    #[error("second `else` for the same `if`")]
    DuplicateElse,
    #[error("instructions after the final `end`")]
    TrailingCode,
}

/// Control-transfer analysis errors.
///
/// Every variant aborts the analysis of the whole body; no partial table is
/// ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("malformed control flow at offset {pc}: {reason}")]
    MalformedControlFlow { pc: Pc, reason: MalformedReason },
    #[error("invalid branch depth {depth} at offset {pc} ({open} scopes open)")]
    InvalidBranchDepth { pc: Pc, depth: u32, open: usize },
    #[error("nesting deeper than {limit} scopes at offset {pc}")]
    NestingTooDeep { pc: Pc, limit: usize },
    #[error("no control instruction reads a transfer at offset {key}")]
    UnexpectedKey { key: Pc },
    #[error("missing control transfer for offset {pc}")]
    MissingTransfer { pc: Pc },
    #[error("control transfer at offset {key} (delta {delta}) does not land on an instruction boundary")]
    InvalidTarget { key: Pc, delta: PcDelta },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl TransferError {
    pub(crate) const fn malformed(pc: Pc, reason: MalformedReason) -> Self {
        Self::MalformedControlFlow { pc, reason }
    }

    /// Offset the error was detected at.
    #[must_use]
    pub const fn pc(&self) -> Pc {
        match self {
            Self::MalformedControlFlow { pc, .. }
            | Self::InvalidBranchDepth { pc, .. }
            | Self::NestingTooDeep { pc, .. }
            | Self::MissingTransfer { pc } => *pc,
            Self::UnexpectedKey { key } | Self::InvalidTarget { key, .. } => *key,
            Self::Decode(err) => err.pc(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
