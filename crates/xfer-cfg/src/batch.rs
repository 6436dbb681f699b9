//! Parallel analysis of many function bodies.

use rayon::prelude::*;
use tracing::{debug, info_span};
use xfer_isa::CompositeDecoder;

use crate::{Result, TransferConfig, TransferTable, compute_with};

/// Compute the transfer tables of independent bodies in parallel.
///
/// Results are returned in input order. A failing body does not affect the
/// others.
#[must_use]
pub fn compute_all<B>(
    bodies: &[B],
    decoder: &CompositeDecoder,
    config: &TransferConfig,
) -> Vec<Result<TransferTable>>
where
    B: AsRef<[u8]> + Sync,
{
    let _span = info_span!("compute_all", bodies = bodies.len()).entered();

    let results: Vec<_> = bodies
        .par_iter()
        .map(|body| compute_with(body.as_ref(), decoder, config))
        .collect();

    let failed = results.iter().filter(|result| result.is_err()).count();
    debug!(bodies = results.len(), failed, "batch control transfers computed");
    results
}
