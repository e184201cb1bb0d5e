//! Antigravity: `~/.gemini/antigravity/brain/<conversation-id>/`.
//!
//! A conversation folder holds planning artifacts rather than a chat log:
//!
//! - `task.md`: checklist (`- [ ]`, `- [/]`, `- [x]`)
//! - `implementation_plan.md`: title, overview, admonitions, bullets
//! - `walkthrough.md`: what was built
//! - `*.metadata.json`: optional `Summary` per artifact
//!
//! Only the most recently active conversation is read. Antigravity does not
//! key conversations by repository, so the repo path is ignored.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::{read_optional, SessionExtractor};
use crate::discovery::{files_with_suffix, latest_antigravity_conversation, ANTIGRAVITY_TASK_FILE};
use crate::error::ExtractError;
use crate::markdown::{
    completed_items, h1_title, in_progress_item, incomplete_items, section_body,
    section_body_until, strip_bullet, NEXT_H2,
};
use crate::synth::{char_len, first_line, is_decision_like, truncate_chars, OrderedSet};
use crate::types::{ContextSource, ExtractedContext};

const PLAN_FILE: &str = "implementation_plan.md";
const WALKTHROUGH_FILE: &str = "walkthrough.md";
const METADATA_SUFFIX: &str = ".metadata.json";

const FALLBACK_TASK: &str = "Antigravity session";
const FALLBACK_STATE: &str = "Loaded from Antigravity brain artifacts";
const SEE_APPROACHES: &str = "See approaches for details.";

const MIN_SENTENCE_LEN: usize = 20;
const MIN_OVERVIEW_LEN: usize = 10;
const MIN_SUMMARY_LEN: usize = 50;
const MIN_CHANGE_LINE_LEN: usize = 10;
const STATE_DETAIL_MAX: usize = 300;
const MAX_CHECKLIST_ITEMS: usize = 8;
const MAX_DONE_ITEMS: usize = 5;

static ALERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)>\s*\[!(?:IMPORTANT|NOTE|WARNING|CAUTION)\]\s*\n((?:>\s*.*?\n)+)")
        .expect("valid regex")
});
static QUOTE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>\s*").expect("valid regex"));
static PLAN_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^-\s+(.+?)$").expect("valid regex"));
static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\. |\n").expect("valid regex"));
static OVERVIEW_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)##\s*(?:Overview|Context|Background)\s*\n").expect("valid regex")
});
static CHANGES_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#{2,4}\s*(?:Changes)\s*\n").expect("valid regex"));
static BUILT_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#{2,4}\s*(?:Implementation Details?|What Was Built)\s*\n")
        .expect("valid regex")
});
static SUBSECTION_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n#{2,4} ").expect("valid regex"));
static FIRST_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##\s*.*?\n").expect("valid regex"));

/// Raw artifact contents of one conversation folder.
#[derive(Debug, Clone, Default)]
pub struct AntigravityArtifacts {
    pub task: String,
    pub plan: Option<String>,
    pub walkthrough: Option<String>,
    /// `Summary` values from the metadata files, in read order.
    pub summaries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArtifactMetadata {
    #[serde(rename = "Summary", default)]
    summary: Option<String>,
}

/// Extractor for Antigravity conversation folders.
#[derive(Debug, Clone)]
pub struct AntigravityExtractor {
    brain_root: PathBuf,
}

impl AntigravityExtractor {
    pub fn new(brain_root: impl Into<PathBuf>) -> Self {
        Self {
            brain_root: brain_root.into(),
        }
    }

    async fn load(&self, dir: &Path) -> Result<AntigravityArtifacts, ExtractError> {
        let mut summaries = Vec::new();
        for path in metadata_files(dir).await? {
            let Some(raw) = read_optional(&path).await? else {
                continue;
            };
            match serde_json::from_str::<ArtifactMetadata>(&raw) {
                Ok(ArtifactMetadata {
                    summary: Some(summary),
                }) => summaries.push(summary),
                Ok(_) => {}
                Err(e) => debug!("Skipping malformed metadata {:?}: {}", path, e),
            }
        }

        Ok(AntigravityArtifacts {
            task: read_optional(&dir.join(ANTIGRAVITY_TASK_FILE))
                .await?
                .unwrap_or_default(),
            plan: read_optional(&dir.join(PLAN_FILE)).await?,
            walkthrough: read_optional(&dir.join(WALKTHROUGH_FILE)).await?,
            summaries,
        })
    }
}

#[async_trait]
impl SessionExtractor for AntigravityExtractor {
    fn name(&self) -> &'static str {
        "antigravity"
    }

    async fn extract(&self, _repo_path: &Path) -> Result<Option<ExtractedContext>, ExtractError> {
        let Some(dir) = latest_antigravity_conversation(&self.brain_root).await? else {
            return Ok(None);
        };
        let artifacts = self.load(&dir).await?;
        info!(conversation = %dir.display(), "Context loaded from Antigravity brain");
        Ok(Some(conversation_context(&artifacts)))
    }
}

/// Metadata files in a stable order: the checklist's, the plan's, then the rest by name.
async fn metadata_files(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let rank = |p: &PathBuf| match p.file_name().and_then(|n| n.to_str()) {
        Some("task.md.metadata.json") => 0,
        Some("implementation_plan.md.metadata.json") => 1,
        _ => 2,
    };
    let mut files = files_with_suffix(dir, METADATA_SUFFIX).await?;
    // Stable sort keeps the name order within each rank.
    files.sort_by_key(rank);
    Ok(files)
}

/// Build context from one conversation's artifacts.
pub fn conversation_context(artifacts: &AntigravityArtifacts) -> ExtractedContext {
    let plan = artifacts.plan.as_deref().unwrap_or_default();
    let plan_title = h1_title(plan);

    let mut decisions = OrderedSet::default();
    let mut approaches = OrderedSet::default();

    collect_alert_decisions(plan, &mut decisions);
    collect_bullet_decisions(plan, &mut decisions);

    if let Some(body) = section_body(plan, &OVERVIEW_HEADING_RE, NEXT_H2) {
        let overview = body.trim();
        if char_len(overview) > MIN_OVERVIEW_LEN {
            approaches.insert(first_line(overview));
        }
    }

    for summary in &artifacts.summaries {
        if char_len(summary) > MIN_SUMMARY_LEN {
            approaches.insert(first_line(summary));
        }
    }

    let current_state = match artifacts.walkthrough.as_deref() {
        Some(walkthrough) => walkthrough_state(walkthrough, &mut decisions, &mut approaches),
        None => String::new(),
    };

    let completed = completed_items(&artifacts.task);
    for item in completed.iter().take(MAX_DONE_ITEMS) {
        approaches.insert(format!("Done: {}", item));
    }

    let mut next_steps = OrderedSet::default();
    for item in incomplete_items(&artifacts.task) {
        next_steps.insert(item);
    }

    let mut ctx = ExtractedContext::new(ContextSource::Antigravity);
    ctx.task = resolve_task(&artifacts.task, &completed, plan_title);
    ctx.approaches = approaches.into_vec();
    ctx.decisions = decisions.into_vec();
    ctx.current_state = if current_state.is_empty() {
        FALLBACK_STATE.to_string()
    } else {
        current_state
    };
    ctx.next_steps = next_steps.into_capped(MAX_CHECKLIST_ITEMS);
    ctx
}

/// In-progress item, else the last two finished items, else a title.
fn resolve_task(task_md: &str, completed: &[String], plan_title: Option<String>) -> String {
    if let Some(item) = in_progress_item(task_md).filter(|t| !t.is_empty()) {
        return item;
    }

    if !completed.is_empty() {
        let joined = completed[completed.len().saturating_sub(2)..].join(" + ");
        return match plan_title {
            Some(title) => format!("{} (Structure: {})", joined, title),
            None => joined,
        };
    }

    plan_title
        .or_else(|| h1_title(task_md))
        .unwrap_or_else(|| FALLBACK_TASK.to_string())
}

/// Sentences from `> [!NOTE]`-style admonitions in the plan.
fn collect_alert_decisions(plan: &str, decisions: &mut OrderedSet) {
    for caps in ALERT_RE.captures_iter(plan) {
        let Some(block) = caps.get(1) else { continue };
        let text = QUOTE_MARKER_RE.replace_all(block.as_str(), "").replace("**", "");
        let text = text.trim();
        if char_len(text) <= MIN_SENTENCE_LEN {
            continue;
        }
        for sentence in SENTENCE_RE.split(text) {
            let sentence = sentence.trim();
            if char_len(sentence) > MIN_SENTENCE_LEN {
                decisions.insert(sentence);
            }
        }
    }
}

/// Top-level plan bullets that read like decisions.
///
/// Bullets that start with a link or point at a `file://` URL are change
/// notices, not decisions.
fn collect_bullet_decisions(plan: &str, decisions: &mut OrderedSet) {
    for caps in PLAN_BULLET_RE.captures_iter(plan) {
        let Some(bullet) = caps.get(1) else { continue };
        let text = bullet.as_str().trim();
        if text.starts_with('[') || text.contains("](file://") {
            continue;
        }
        for sentence in SENTENCE_RE.split(text) {
            let sentence = sentence.trim();
            if char_len(sentence) > MIN_SENTENCE_LEN && is_decision_like(sentence) {
                decisions.insert(sentence);
            }
        }
    }
}

/// Current state from the walkthrough; reclassifies its change list as a side effect.
fn walkthrough_state(
    walkthrough: &str,
    decisions: &mut OrderedSet,
    approaches: &mut OrderedSet,
) -> String {
    let title = h1_title(walkthrough).unwrap_or_default();

    let changes = section_body_until(walkthrough, &CHANGES_HEADING_RE, &SUBSECTION_BOUNDARY_RE)
        .or_else(|| section_body_until(walkthrough, &BUILT_HEADING_RE, &SUBSECTION_BOUNDARY_RE));

    if let Some(body) = changes {
        for line in body.trim().split('\n') {
            let cleaned = strip_bullet(line);
            if char_len(&cleaned) < MIN_CHANGE_LINE_LEN {
                continue;
            }
            let trimmed = line.trim();
            if is_decision_like(&cleaned) {
                decisions.insert(cleaned);
            } else if (trimmed.starts_with('-') || trimmed.starts_with('*'))
                && !cleaned.starts_with('[')
            {
                approaches.insert(cleaned);
            }
        }
        return join_state(&title, SEE_APPROACHES);
    }

    match section_body(walkthrough, &FIRST_SECTION_RE, NEXT_H2) {
        Some(body) => join_state(&title, &truncate_chars(body.trim(), STATE_DETAIL_MAX)),
        None => title,
    }
}

fn join_state(title: &str, detail: &str) -> String {
    if title.is_empty() {
        detail.to_string()
    } else {
        format!("{}. {}", title, detail)
    }
}
