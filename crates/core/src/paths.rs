//! Centralized path functions for the editor storage locations we read.
//!
//! Single source of truth for where each integration keeps its data, so
//! extractors never call `dirs::home_dir()` themselves.

use std::path::{Path, PathBuf};

use crate::error::DiscoveryError;

/// Root directories of the three supported editor integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoots {
    /// Claude Code projects: `~/.claude/projects/`.
    pub claude_projects: PathBuf,
    /// Antigravity conversation folders: `~/.gemini/antigravity/brain/`.
    pub antigravity_brain: PathBuf,
    /// Cursor application data: `~/.cursor/`.
    pub cursor_dir: PathBuf,
}

impl StorageRoots {
    /// Roots under an explicit home directory.
    pub fn from_home(home: &Path) -> Self {
        Self {
            claude_projects: home.join(".claude").join("projects"),
            antigravity_brain: home.join(".gemini").join("antigravity").join("brain"),
            cursor_dir: home.join(".cursor"),
        }
    }

    /// Roots under the current user's home directory.
    ///
    /// # Errors
    /// Returns `DiscoveryError::HomeDirNotFound` if the home directory cannot be determined.
    pub fn discover() -> Result<Self, DiscoveryError> {
        let home = dirs::home_dir().ok_or(DiscoveryError::HomeDirNotFound)?;
        Ok(Self::from_home(&home))
    }

    /// Cursor's per-workspace state directory: `~/.cursor/User/workspaceStorage/`.
    pub fn cursor_workspace_storage(&self) -> PathBuf {
        self.cursor_dir.join("User").join("workspaceStorage")
    }
}
