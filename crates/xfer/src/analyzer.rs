//! Analysis pipeline: body framing → decoding → control transfers.

use rayon::prelude::*;
use tracing::{debug_span, info_span};
use xfer_cfg::{TransferConfig, TransferTable, compute_all, compute_with};
use xfer_isa::{CompositeDecoder, InstructionSet};

use crate::{FunctionBody, Result};

/// Control-transfer analyzer.
///
/// Owns the decoder chain and the configuration so many bodies can be
/// analyzed with the same setup.
#[derive(Default)]
pub struct Analyzer {
    decoder: CompositeDecoder,
    config: TransferConfig,
}

impl Analyzer {
    /// Create an analyzer with the standard instruction sets.
    #[must_use]
    pub fn new(config: TransferConfig) -> Self {
        Self::with_decoder(CompositeDecoder::standard(), config)
    }

    /// Create an analyzer with a custom decoder chain.
    #[must_use]
    pub const fn with_decoder(decoder: CompositeDecoder, config: TransferConfig) -> Self {
        Self { decoder, config }
    }

    /// Add an instruction set to the end of the decoder chain.
    pub fn add_set(&mut self, set: impl InstructionSet + 'static) {
        self.decoder = std::mem::take(&mut self.decoder).with_set(set);
    }

    #[must_use]
    pub const fn decoder(&self) -> &CompositeDecoder {
        &self.decoder
    }

    #[must_use]
    pub const fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Analyze a bare expression (instruction bytes ending in `end`).
    ///
    /// # Errors
    /// Any [`TransferError`](xfer_cfg::TransferError) of the pass.
    pub fn analyze_expr(&self, code: &[u8]) -> Result<TransferTable> {
        Ok(compute_with(code, &self.decoder, &self.config)?)
    }

    /// Analyze a function body with its locals prelude.
    ///
    /// Keys of the returned table are relative to the expression start,
    /// i.e. `FunctionBody::code_offset` bytes into `bytes`.
    ///
    /// # Errors
    /// Prelude errors from [`FunctionBody::parse`], then any error of the pass.
    pub fn analyze_body(&self, bytes: &[u8]) -> Result<TransferTable> {
        let body = FunctionBody::parse(bytes)?;
        let _span = debug_span!(
            "analyze_body",
            locals = body.num_locals(),
            code_offset = body.code_offset
        )
        .entered();
        self.analyze_expr(body.code)
    }

    /// Analyze many function bodies in parallel, preserving input order.
    #[must_use]
    pub fn analyze_all<B>(&self, bodies: &[B]) -> Vec<Result<TransferTable>>
    where
        B: AsRef<[u8]> + Sync,
    {
        let _span = info_span!("analyze_all", bodies = bodies.len()).entered();
        bodies
            .par_iter()
            .map(|bytes| self.analyze_body(bytes.as_ref()))
            .collect()
    }

    /// Analyze many bare expressions in parallel, preserving input order.
    #[must_use]
    pub fn analyze_exprs<B>(&self, exprs: &[B]) -> Vec<Result<TransferTable>>
    where
        B: AsRef<[u8]> + Sync,
    {
        compute_all(exprs, &self.decoder, &self.config)
            .into_iter()
            .map(|result| result.map_err(Into::into))
            .collect()
    }
}
