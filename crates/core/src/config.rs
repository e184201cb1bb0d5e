// crates/core/src/config.rs
//! Extraction configuration.

use std::path::PathBuf;

use crate::error::DiscoveryError;
use crate::paths::StorageRoots;
use crate::tail::DEFAULT_TAIL_LINES;
use crate::transcript::DEFAULT_CHAR_BUDGET;

/// Knobs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub roots: StorageRoots,
    /// Trailing session lines scanned by the session extractor.
    pub tail_lines: usize,
    /// Character budget for the compacted transcript.
    pub transcript_char_budget: usize,
}

impl ExtractConfig {
    pub fn new(roots: StorageRoots) -> Self {
        Self {
            roots,
            tail_lines: DEFAULT_TAIL_LINES,
            transcript_char_budget: DEFAULT_CHAR_BUDGET,
        }
    }

    /// Build from the environment.
    ///
    /// - `CTXSAVER_HOME` replaces the home directory used to locate editor storage
    /// - `CTXSAVER_TAIL_LINES` overrides the session tail window
    /// - `CTXSAVER_TRANSCRIPT_BUDGET` overrides the transcript character budget
    ///
    /// Unparseable or zero numeric values fall back to the defaults.
    pub fn from_env() -> Result<Self, DiscoveryError> {
        let roots = match std::env::var_os("CTXSAVER_HOME") {
            Some(home) if !home.is_empty() => StorageRoots::from_home(&PathBuf::from(home)),
            _ => StorageRoots::discover()?,
        };

        Ok(Self::new(roots).with_env_limits())
    }

    /// Apply the numeric environment overrides, keeping `roots` as given.
    pub fn with_env_limits(mut self) -> Self {
        if let Some(n) = env_usize("CTXSAVER_TAIL_LINES") {
            self.tail_lines = n;
        }
        if let Some(n) = env_usize("CTXSAVER_TRANSCRIPT_BUDGET") {
            self.transcript_char_budget = n;
        }
        self
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|n: &usize| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::new(StorageRoots::from_home(Path::new("/h")));
        assert_eq!(config.tail_lines, 500);
        assert_eq!(config.transcript_char_budget, 60_000);
    }

    #[test]
    fn test_env_usize_rejects_garbage() {
        // Keys are unique to this test so parallel tests can't interfere.
        std::env::set_var("CTXSAVER_TEST_GARBAGE", "lots");
        std::env::set_var("CTXSAVER_TEST_ZERO", "0");
        std::env::set_var("CTXSAVER_TEST_OK", " 42 ");
        assert_eq!(env_usize("CTXSAVER_TEST_GARBAGE"), None);
        assert_eq!(env_usize("CTXSAVER_TEST_ZERO"), None);
        assert_eq!(env_usize("CTXSAVER_TEST_OK"), Some(42));
        assert_eq!(env_usize("CTXSAVER_TEST_UNSET_KEY"), None);
    }
}
