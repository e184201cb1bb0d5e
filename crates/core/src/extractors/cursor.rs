// crates/core/src/extractors/cursor.rs
//! Cursor: recognized, not parsed.
//!
//! Cursor keeps chat history in a SQLite `state.vscdb` per workspace. We only
//! detect that one exists among recent workspaces and log it; the database is
//! never opened.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::SessionExtractor;
use crate::discovery::{find_cursor_workspace, CursorWorkspace};
use crate::error::ExtractError;
use crate::types::ExtractedContext;

#[derive(Debug, Clone)]
pub struct CursorExtractor {
    workspace_storage: PathBuf,
}

impl CursorExtractor {
    /// `workspace_storage` is Cursor's `User/workspaceStorage` directory.
    pub fn new(workspace_storage: impl Into<PathBuf>) -> Self {
        Self {
            workspace_storage: workspace_storage.into(),
        }
    }
}

#[async_trait]
impl SessionExtractor for CursorExtractor {
    fn name(&self) -> &'static str {
        "cursor"
    }

    async fn extract(&self, _repo_path: &Path) -> Result<Option<ExtractedContext>, ExtractError> {
        if let Some(CursorWorkspace::ChatDatabase(db)) =
            find_cursor_workspace(&self.workspace_storage).await?
        {
            debug!(db = %db.display(), "Cursor chat database found; format not supported");
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_detected_database_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path().join("abc123");
        std::fs::create_dir_all(&ws).unwrap();
        std::fs::write(ws.join("state.vscdb"), b"SQLite format 3\0").unwrap();

        let extractor = CursorExtractor::new(tmp.path());
        assert!(extractor.extract(Path::new("/repo")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_storage_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let extractor = CursorExtractor::new(tmp.path().join("nope"));
        assert!(extractor.extract(Path::new("/repo")).await.unwrap().is_none());
    }
}
