use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extractor produced an [`ExtractedContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextSource {
    ClaudeCodeSession,
    ClaudeCodeMemory,
    Antigravity,
}

impl ContextSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeCodeSession => "claude-code-session",
            Self::ClaudeCodeMemory => "claude-code-memory",
            Self::Antigravity => "antigravity",
        }
    }
}

impl fmt::Display for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured coding-session context recovered from an editor's storage.
///
/// Built fresh for every extraction call and never persisted here; the
/// context-save pipeline owns merging it into branch state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContext {
    pub task: String,
    pub approaches: Vec<String>,
    pub decisions: Vec<String>,
    pub current_state: String,
    pub next_steps: Vec<String>,
    pub blockers: Vec<String>,
    pub source: ContextSource,
}

impl ExtractedContext {
    /// Empty context tagged with `source`; extractors fill the fields in.
    pub fn new(source: ContextSource) -> Self {
        Self {
            task: String::new(),
            approaches: Vec::new(),
            decisions: Vec::new(),
            current_state: String::new(),
            next_steps: Vec::new(),
            blockers: Vec::new(),
            source,
        }
    }

    /// The runner only accepts results that name a task.
    pub fn has_task(&self) -> bool {
        !self.task.is_empty()
    }
}

/// One tool invocation, summarized for the compacted transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallSummary {
    pub tool_name: String,
    pub detail: String,
}

impl fmt::Display for ToolCallSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            f.write_str(&self.tool_name)
        } else {
            write!(f, "{}({})", self.tool_name, self.detail)
        }
    }
}
