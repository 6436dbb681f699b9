//! Function-body framing.

use wasmparser::{BinaryReader, ValType};
use xfer_isa::Pc;

use crate::{Error, Result};

/// Upper bound on declared locals per function (the JS embedding limit).
pub const MAX_LOCALS: u32 = 50_000;

/// A run of `count` locals of the same type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalDecl {
    pub count: u32,
    pub ty: ValType,
}

/// A function body split into its locals prelude and its expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionBody<'a> {
    /// Local declarations, in encoding order.
    pub locals: Vec<LocalDecl>,
    /// Offset of the first instruction within the body bytes.
    pub code_offset: Pc,
    /// Instruction bytes, including the final `end`.
    pub code: &'a [u8],
}

impl<'a> FunctionBody<'a> {
    /// Split `bytes` (a code section entry without its size prefix) into the
    /// locals prelude and the expression.
    ///
    /// # Errors
    /// `Decode` for a truncated or malformed prelude, `TooManyLocals` when
    /// the declared locals exceed [`MAX_LOCALS`].
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let body = wasmparser::FunctionBody::new(BinaryReader::new(bytes, 0));
        let mut reader = body.get_locals_reader()?;
        let mut locals = Vec::new();
        let mut total = 0u64;

        for _ in 0..reader.get_count() {
            let (count, ty) = reader.read()?;
            total += u64::from(count);
            if total > u64::from(MAX_LOCALS) {
                return Err(Error::TooManyLocals {
                    total,
                    max: MAX_LOCALS,
                });
            }
            locals.push(LocalDecl { count, ty });
        }

        let code_offset = reader.original_position();
        Ok(Self {
            locals,
            code_offset,
            code: &bytes[code_offset..],
        })
    }

    /// Total number of declared locals.
    #[must_use]
    pub fn num_locals(&self) -> u32 {
        self.locals.iter().map(|decl| decl.count).sum()
    }
}
