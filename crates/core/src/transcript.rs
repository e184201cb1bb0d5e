// crates/core/src/transcript.rs
//! Compacted plain-text transcript of the latest Claude Code session.
//!
//! Unlike the extractors this reads the whole session file and keeps the
//! conversation itself, bounded by a character budget instead of a line
//! window. Tool calls are reduced to one-line summaries so file contents and
//! command output never reach the transcript.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::discovery::{find_claude_project_dir, latest_session_file};
use crate::error::ExtractError;
use crate::parser::{parse_line, EntryKind, ToolUse};
use crate::paths::StorageRoots;
use crate::synth::{char_len, truncate_chars};
use crate::tail::read_all_lines;
use crate::types::ToolCallSummary;

/// Upper bound on the transcript length, in characters.
pub const DEFAULT_CHAR_BUDGET: usize = 60_000;

const MIN_TEXT_LEN: usize = 5;
const DETAIL_MAX: usize = 80;

/// Turns a session log into a bounded transcript.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptCompactor {
    budget: usize,
}

impl Default for TranscriptCompactor {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_BUDGET)
    }
}

impl TranscriptCompactor {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Compact the most recent session of the project matching `repo_path`.
    ///
    /// `Ok(None)` when no project, no session or no usable turns exist.
    pub async fn compact_repo(
        &self,
        projects_root: &Path,
        repo_path: &Path,
    ) -> Result<Option<String>, ExtractError> {
        let Some(project_dir) = find_claude_project_dir(projects_root, repo_path).await? else {
            return Ok(None);
        };
        let Some(session) = latest_session_file(&project_dir).await? else {
            return Ok(None);
        };

        let lines = read_all_lines(&session).await?;
        let transcript = self.compact_lines(&lines);
        if let Some(t) = &transcript {
            info!(
                session = %session.display(),
                chars = char_len(t),
                "Transcript compacted"
            );
        }
        Ok(transcript)
    }

    /// Compact raw session-log lines. `None` if no turn survived.
    pub fn compact_lines(&self, lines: &[String]) -> Option<String> {
        let mut out = TurnBuffer::new(self.budget);
        let mut pending: Vec<ToolCallSummary> = Vec::new();

        for line in lines {
            let Some(msg) = parse_line(line) else {
                continue;
            };

            if matches!(msg.kind, EntryKind::Assistant | EntryKind::Progress) {
                pending.extend(msg.tool_uses.iter().map(summarize_tool_use));
            }

            let label = match msg.kind {
                EntryKind::User => "[USER]",
                EntryKind::Assistant => "[CLAUDE]",
                EntryKind::Progress | EntryKind::Other => continue,
            };

            // Tool calls belong to the assistant turn before this user input.
            if msg.kind == EntryKind::User && !pending.is_empty() {
                if !out.push(tools_line(&pending)) {
                    return out.finish();
                }
                pending.clear();
            }

            if char_len(&msg.text) < MIN_TEXT_LEN {
                continue;
            }
            if !out.push(format!("{}: {}\n", label, msg.text.trim())) {
                return out.finish();
            }
        }

        if !pending.is_empty() {
            out.push(tools_line(&pending));
        }
        out.finish()
    }
}

/// Turns joined by `\n`, never longer than the budget.
struct TurnBuffer {
    turns: Vec<String>,
    chars: usize,
    budget: usize,
}

impl TurnBuffer {
    fn new(budget: usize) -> Self {
        Self {
            turns: Vec::new(),
            chars: 0,
            budget,
        }
    }

    /// Append a turn if it fits. `false` means the budget is spent.
    fn push(&mut self, turn: String) -> bool {
        let separator = usize::from(!self.turns.is_empty());
        let cost = char_len(&turn) + separator;
        if self.chars + cost > self.budget {
            debug!(kept = self.turns.len(), "Transcript budget reached");
            return false;
        }
        self.chars += cost;
        self.turns.push(turn);
        true
    }

    fn finish(self) -> Option<String> {
        if self.turns.is_empty() {
            None
        } else {
            Some(self.turns.join("\n"))
        }
    }
}

fn tools_line(pending: &[ToolCallSummary]) -> String {
    let calls: Vec<String> = pending.iter().map(ToString::to_string).collect();
    format!("[CLAUDE used tools]: {}\n", calls.join(" | "))
}

/// One-line summary of a tool call: the argument that identifies what it touched.
pub fn summarize_tool_use(tool: &ToolUse) -> ToolCallSummary {
    let input = &tool.input;
    let detail = match tool.name.as_str() {
        "Read" | "read_file" | "Write" | "write_file" => {
            first_str(input, &["path", "file_path"]).to_string()
        }
        "Bash" | "bash" | "execute_command" => {
            truncate_chars(first_str(input, &["command", "cmd"]), DETAIL_MAX)
        }
        "Glob" | "glob" => first_str(input, &["pattern", "glob_pattern"]).to_string(),
        "Grep" | "grep" => format!(
            "\"{}\" in {}",
            first_str(input, &["pattern"]),
            first_str(input, &["path"])
        ),
        "Task" => first_str(input, &["description"]).to_string(),
        _ => truncate_chars(&serde_json::to_string(input).unwrap_or_default(), DETAIL_MAX),
    };
    ToolCallSummary {
        tool_name: tool.name.clone(),
        detail,
    }
}

/// First non-empty string among `keys`, or `""`.
fn first_str<'a>(input: &'a Value, keys: &[&str]) -> &'a str {
    keys.iter()
        .filter_map(|k| input.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Transcript of the latest session for `repo_path`, or `None`.
///
/// Errors are logged and reported as no transcript.
pub async fn extract_full_transcript(repo_path: &Path, roots: &StorageRoots) -> Option<String> {
    match TranscriptCompactor::default()
        .compact_repo(&roots.claude_projects, repo_path)
        .await
    {
        Ok(transcript) => transcript,
        Err(e) => {
            warn!(error = %e, "Failed to build session transcript");
            None
        }
    }
}
