//! Shared helpers for control-transfer integration tests.

#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use xfer::{Analyzer, Pc, PcDelta, TransferConfig, TransferTable};
use xfer_isa::OP_END;

static TRACING: Once = Once::new();

/// Route library logs through the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Analyzer with target verification turned on.
pub fn verifying_analyzer() -> Analyzer {
    Analyzer::new(TransferConfig::default().with_verify_targets(true))
}

/// Append the closing `end` of the implicit scope.
pub fn with_end(code: &[u8]) -> Vec<u8> {
    let mut code = code.to_vec();
    code.push(OP_END);
    code
}

/// Analyze `code` plus a final `end`.
pub fn transfers(code: &[u8]) -> TransferTable {
    init_tracing();
    let code = with_end(code);
    match verifying_analyzer().analyze_expr(&code) {
        Ok(table) => table,
        Err(err) => panic!("analysis of {code:02x?} failed: {err}"),
    }
}

/// Check the exact set of transfers of `code` plus a final `end`.
pub fn check_pc_deltas(code: &[u8], expected: &[(Pc, PcDelta)]) {
    let table = transfers(code);
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(table.sorted(), expected, "computed transfers:\n{table}");
}
