//! Claude Code: `~/.claude/projects/<encoded-repo-path>/`.
//!
//! Two sources live in the project directory. The structured memory files
//! under `memory/` win when they name a task or conventions; otherwise the
//! most recent `*.jsonl` session log is tail-read and run through the field
//! synthesizer.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::{read_optional, SessionExtractor};
use crate::discovery::{find_claude_project_dir, files_with_suffix, is_dir, latest_session_file};
use crate::error::ExtractError;
use crate::markdown::{body_lines, section_body, strip_bullet, NEXT_H2};
use crate::parser::{parse_line, EntryKind};
use crate::synth::{
    char_len, extract_approaches, extract_decisions, extract_next_steps, extract_state,
    first_line, truncate_chars, OrderedSet,
};
use crate::tail::{tail_lines, DEFAULT_TAIL_LINES};
use crate::types::{ContextSource, ExtractedContext};

/// The memory file that describes the project itself.
pub const MEMORY_INDEX_FILE: &str = "MEMORY.md";

const MEMORY_DIR: &str = "memory";
const MEMORY_SECTION_LINES: usize = 5;
const MEMORY_LINE_MIN_LEN: usize = 10;

const MIN_MESSAGE_LEN: usize = 5;
const MIN_ASSISTANT_LEN: usize = 20;
const INTENT_MESSAGES: usize = 3;
const RECENT_ASSISTANT_MESSAGES: usize = 10;
const TASK_LINE_MAX: usize = 300;
const TASK_FALLBACK_LEN: usize = 200;
const FOLLOW_UP_MAX: usize = 200;

static PROJECT_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)##\s*Project\s*(?:Location|Overview)?\s*\n").expect("valid regex")
});
static CONVENTIONS_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*Conventions?\s*\n").expect("valid regex"));
static PATTERNS_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*Patterns?\s*\n").expect("valid regex"));
/// `- **Label**: ` prefix on the project line.
static BOLD_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s*\*\*.*?\*\*:\s*").expect("valid regex"));

/// Extractor for Claude Code project directories.
#[derive(Debug, Clone)]
pub struct ClaudeCodeExtractor {
    projects_root: PathBuf,
    tail_lines: usize,
}

impl ClaudeCodeExtractor {
    pub fn new(projects_root: impl Into<PathBuf>) -> Self {
        Self {
            projects_root: projects_root.into(),
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    pub fn with_tail_lines(mut self, tail_lines: usize) -> Self {
        self.tail_lines = tail_lines;
        self
    }

    async fn read_memory(&self, memory_dir: &Path) -> Result<Option<ExtractedContext>, ExtractError> {
        let mut files = Vec::new();
        for path in files_with_suffix(memory_dir, ".md").await? {
            let Some(content) = read_optional(&path).await? else {
                continue;
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            files.push((name, content));
        }
        Ok(memory_context(&files))
    }
}

#[async_trait]
impl SessionExtractor for ClaudeCodeExtractor {
    fn name(&self) -> &'static str {
        "claude-code"
    }

    async fn extract(&self, repo_path: &Path) -> Result<Option<ExtractedContext>, ExtractError> {
        let Some(project_dir) = find_claude_project_dir(&self.projects_root, repo_path).await?
        else {
            return Ok(None);
        };

        let memory_dir = project_dir.join(MEMORY_DIR);
        if is_dir(&memory_dir).await {
            if let Some(ctx) = self.read_memory(&memory_dir).await? {
                info!(project = %project_dir.display(), "Context loaded from Claude Code memory");
                return Ok(Some(ctx));
            }
            debug!("Memory files had no task or conventions, falling back to session log");
        }

        let Some(session) = latest_session_file(&project_dir).await? else {
            return Ok(None);
        };
        let lines = tail_lines(&session, self.tail_lines).await?;
        let ctx = session_context(&lines);
        if ctx.is_some() {
            info!(session = %session.display(), "Context parsed from Claude Code session");
        }
        Ok(ctx)
    }
}

/// Build context from `(file name, content)` pairs of a project's memory directory.
///
/// Returns `None` unless a task or at least one convention was found.
pub fn memory_context(files: &[(String, String)]) -> Option<ExtractedContext> {
    let mut task = String::new();
    let mut decisions = OrderedSet::default();
    let mut approaches = OrderedSet::default();

    for (name, content) in files {
        if name == MEMORY_INDEX_FILE {
            if let Some(body) = section_body(content, &PROJECT_HEADING_RE, NEXT_H2) {
                task = body_lines(body)
                    .next()
                    .map(|l| BOLD_LABEL_RE.replace(l, "").trim().to_string())
                    .unwrap_or_default();
            }
        }

        if let Some(body) = section_body(content, &CONVENTIONS_HEADING_RE, NEXT_H2) {
            for line in body_lines(body).take(MEMORY_SECTION_LINES) {
                let cleaned = strip_bullet(line);
                if char_len(&cleaned) > MEMORY_LINE_MIN_LEN {
                    decisions.insert(cleaned);
                }
            }
        }

        if let Some(body) = section_body(content, &PATTERNS_HEADING_RE, NEXT_H2) {
            for line in body_lines(body).take(MEMORY_SECTION_LINES) {
                let cleaned = strip_bullet(line);
                if char_len(&cleaned) > MEMORY_LINE_MIN_LEN {
                    approaches.insert(cleaned);
                }
            }
        }
    }

    let decisions = decisions.into_vec();
    if task.is_empty() && decisions.is_empty() {
        return None;
    }

    let mut ctx = ExtractedContext::new(ContextSource::ClaudeCodeMemory);
    ctx.task = if task.is_empty() {
        "Project session (from Claude Code memory)".to_string()
    } else {
        task
    };
    ctx.decisions = decisions;
    ctx.approaches = approaches.into_vec();
    ctx.current_state = "Loaded from Claude Code memory files".to_string();
    Some(ctx)
}

/// Build context from the (tail of the) lines of a session log.
///
/// The first user messages carry intent; the recent assistant messages carry
/// decisions, approaches, state and next steps. Returns `None` when no user
/// message was found.
pub fn session_context(lines: &[String]) -> Option<ExtractedContext> {
    let mut intents: Vec<String> = Vec::new();
    let mut assistant: Vec<String> = Vec::new();

    for line in lines {
        let Some(msg) = parse_line(line) else {
            continue;
        };
        let len = char_len(&msg.text);
        if len < MIN_MESSAGE_LEN {
            continue;
        }
        match msg.kind {
            EntryKind::User if intents.len() < INTENT_MESSAGES => intents.push(msg.text),
            EntryKind::Assistant if len > MIN_ASSISTANT_LEN => assistant.push(msg.text),
            _ => {}
        }
    }

    let intent = intents.first()?;
    let intent_line = first_line(intent);
    let task = if char_len(intent_line) < TASK_LINE_MAX {
        intent_line.to_string()
    } else {
        truncate_chars(intent, TASK_FALLBACK_LEN)
    };

    let recent = &assistant[assistant.len().saturating_sub(RECENT_ASSISTANT_MESSAGES)..];

    let mut approaches = OrderedSet::default();
    for follow_up in intents.iter().skip(1) {
        let line = truncate_chars(first_line(follow_up), FOLLOW_UP_MAX);
        approaches.insert(format!("User also asked: {}", line));
    }
    for approach in extract_approaches(recent) {
        approaches.insert(approach);
    }

    let state = extract_state(recent);

    let mut ctx = ExtractedContext::new(ContextSource::ClaudeCodeSession);
    ctx.task = task;
    ctx.approaches = approaches.into_vec();
    ctx.decisions = extract_decisions(recent);
    ctx.current_state = if state.is_empty() {
        "Session data parsed from Claude Code".to_string()
    } else {
        state
    };
    ctx.next_steps = extract_next_steps(recent);
    Some(ctx)
}
