use thiserror::Error;

/// Analysis errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] xfer_isa::DecodeError),
    #[error("control transfer error: {0}")]
    Transfer(#[from] xfer_cfg::TransferError),
    #[error("function body declares {total} locals, more than {max}")]
    TooManyLocals { total: u64, max: u32 },
}

impl From<wasmparser::BinaryReaderError> for Error {
    fn from(err: wasmparser::BinaryReaderError) -> Self {
        Self::Decode(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
