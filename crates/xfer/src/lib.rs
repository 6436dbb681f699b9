//! XFER - control-transfer tables for structured wasm bytecode
//!
//! Maps the offset of every `if`, `else`, `br`, `br_if` and `br_table` entry
//! in a function body to the pc delta an interpreter applies when the
//! transfer is taken.
//!
//! # Example
//!
//! ```
//! use xfer::{Analyzer, BlockType, CodeBuilder, TransferConfig};
//!
//! // loop; br 0; end; end
//! let code = CodeBuilder::new()
//!     .begin_loop(BlockType::Empty)
//!     .br(0)
//!     .end()
//!     .end()
//!     .finish();
//!
//! let analyzer = Analyzer::new(TransferConfig::default());
//! let table = analyzer.analyze_expr(&code).unwrap();
//! assert_eq!(table.get(2), Some(-2));
//! ```

// Re-export from sub-crates
pub use xfer_cfg::{
    DEFAULT_MAX_NESTING_DEPTH, MalformedReason, TransferConfig, TransferError, TransferTable,
    compute, compute_all, compute_with, verify_targets,
};
pub use xfer_isa::{
    BlockType, CodeBuilder, CompositeDecoder, DecodeError, DecodedInstr, InstrKind,
    InstructionSet, OpId, Pc, PcDelta, ValType, WasmSet, apply_delta, decode, pc_delta,
};

mod analyzer;
mod body;
mod error;

pub use analyzer::*;
pub use body::*;
pub use error::*;
