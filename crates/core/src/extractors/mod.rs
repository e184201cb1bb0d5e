//! Per-integration context extractors.
//!
//! Every extractor answers the same question for its own storage format:
//! "given this repository, what was the last coding session about?" The
//! runner tries them in a fixed order and keeps the first useful answer.

mod antigravity;
mod claude;
mod cursor;

pub use antigravity::{conversation_context, AntigravityArtifacts, AntigravityExtractor};
pub use claude::{memory_context, session_context, ClaudeCodeExtractor, MEMORY_INDEX_FILE};
pub use cursor::CursorExtractor;

use async_trait::async_trait;
use std::path::Path;

use crate::error::ExtractError;
use crate::types::ExtractedContext;

/// A parser for one editor integration's storage.
///
/// `Ok(None)` means "nothing usable here"; `Err` means the source existed
/// but could not be read. The runner treats both as no result.
#[async_trait]
pub trait SessionExtractor: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn extract(&self, repo_path: &Path) -> Result<Option<ExtractedContext>, ExtractError>;
}

/// Read a UTF-8 text file, treating "not found" as absent.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>, ExtractError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ExtractError::io(path, e)),
    }
}
