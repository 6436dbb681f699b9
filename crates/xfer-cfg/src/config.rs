//! Analysis configuration.

/// Default limit on simultaneously open scopes, the implicit outer scope included.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 1024;

/// Configuration for control-transfer analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferConfig {
    /// Maximum number of open scopes, counting the implicit outer scope.
    /// Exceeding it fails with `NestingTooDeep`.
    pub max_nesting_depth: usize,
    /// Re-decode the body after the pass and check every entry of the
    /// produced table lands on an instruction boundary.
    pub verify_targets: bool,
}

impl TransferConfig {
    /// Set the nesting limit.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, limit: usize) -> Self {
        self.max_nesting_depth = limit;
        self
    }

    /// Enable or disable post-pass target verification.
    #[must_use]
    pub const fn with_verify_targets(mut self, enabled: bool) -> Self {
        self.verify_targets = enabled;
        self
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            verify_targets: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = TransferConfig::default()
            .with_max_nesting_depth(8)
            .with_verify_targets(true);
        assert_eq!(config.max_nesting_depth, 8);
        assert!(config.verify_targets);
        assert!(!TransferConfig::default().verify_targets);
    }
}
