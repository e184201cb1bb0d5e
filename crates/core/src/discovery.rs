// crates/core/src/discovery.rs
//! Source discovery for the supported editor integrations.
//!
//! Each integration keeps its data in a different layout:
//!
//! ```text
//! ~/.claude/projects/<encoded-repo-path>/<session-id>.jsonl
//! ~/.claude/projects/<encoded-repo-path>/memory/*.md
//! ~/.gemini/antigravity/brain/<conversation-id>/{task,implementation_plan,walkthrough}.md
//! ~/.cursor/User/workspaceStorage/<workspace-hash>/state.vscdb
//! ```
//!
//! Every "most recent" pick sorts by modification time, newest first, and
//! breaks ties on the entry name so the choice is reproducible.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;
use tracing::debug;

use crate::error::DiscoveryError;

/// Checklist file that marks a usable Antigravity conversation.
pub const ANTIGRAVITY_TASK_FILE: &str = "task.md";

/// Cursor's per-workspace chat database (presence-checked only).
pub const CURSOR_CHAT_DB: &str = "state.vscdb";

/// How many recent Cursor workspaces are checked for a chat database.
const CURSOR_RECENT_WORKSPACES: usize = 3;

/// Encode a repository path the way Claude Code names project directories:
/// every character outside `[A-Za-z0-9]` becomes `-`.
///
/// `/Users/foo/my_project` becomes `-Users-foo-my-project`.
pub fn encode_repo_path(repo_path: &str) -> String {
    repo_path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Whether a Claude project directory name belongs to the encoded repo path.
///
/// Both sides are normalized identically, then compared by suffix in both
/// directions (the repo side minus its leading character). Short repo paths
/// can match unrelated directories; callers visit candidates in name order so
/// the result is at least deterministic.
pub fn project_dir_matches(encoded_repo: &str, dir_name: &str) -> bool {
    let normalized_dir = encode_repo_path(dir_name);
    let repo_tail = encoded_repo
        .char_indices()
        .nth(1)
        .map(|(i, _)| &encoded_repo[i..])
        .unwrap_or("");
    encoded_repo.ends_with(&normalized_dir) || normalized_dir.ends_with(repo_tail)
}

/// Find the Claude project directory for `repo_path`.
///
/// Returns `Ok(None)` when the projects root is missing or nothing matches.
pub async fn find_claude_project_dir(
    projects_root: &Path,
    repo_path: &Path,
) -> Result<Option<PathBuf>, DiscoveryError> {
    let encoded = encode_repo_path(&repo_path.to_string_lossy());

    let mut candidates = list_entries(projects_root)
        .await?
        .into_iter()
        .filter(|e| e.is_dir)
        .collect::<Vec<_>>();
    candidates.sort_by(|a, b| a.name.cmp(&b.name));

    let found = candidates
        .into_iter()
        .find(|e| project_dir_matches(&encoded, &e.name))
        .map(|e| e.path);

    debug!(repo = %repo_path.display(), found = ?found, "Claude project lookup");
    Ok(found)
}

/// Most recently modified `*.jsonl` session file in a Claude project directory.
pub async fn latest_session_file(project_dir: &Path) -> Result<Option<PathBuf>, DiscoveryError> {
    let mut sessions = Vec::new();
    for entry in list_entries(project_dir).await? {
        if entry.is_dir || entry.path.extension().map(|e| e != "jsonl").unwrap_or(true) {
            continue;
        }
        match modified(&entry.path).await {
            Some(mtime) => sessions.push((mtime, entry)),
            None => debug!("Skipping session file without mtime: {:?}", entry.path),
        }
    }
    Ok(newest(sessions))
}

/// Antigravity conversation directory whose checklist was touched last.
///
/// Each candidate is ranked by the mtime of its `task.md`, or of the directory
/// itself when the task file can't be stat'ed. Conversations without a task
/// file are never selected.
pub async fn latest_antigravity_conversation(
    brain_root: &Path,
) -> Result<Option<PathBuf>, DiscoveryError> {
    let mut conversations = Vec::new();
    for entry in list_entries(brain_root).await? {
        if !entry.is_dir {
            continue;
        }
        let task_file = entry.path.join(ANTIGRAVITY_TASK_FILE);
        if !is_file(&task_file).await {
            continue;
        }
        let mtime = match modified(&task_file).await {
            Some(t) => Some(t),
            None => modified(&entry.path).await,
        };
        if let Some(mtime) = mtime {
            conversations.push((mtime, entry));
        }
    }
    Ok(newest(conversations))
}

/// What the Cursor locator found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorWorkspace {
    /// A recent workspace holds a chat database. Recognized, never parsed.
    ChatDatabase(PathBuf),
}

/// Look for a chat database among the three most recently modified Cursor workspaces.
pub async fn find_cursor_workspace(
    workspace_storage: &Path,
) -> Result<Option<CursorWorkspace>, DiscoveryError> {
    let mut workspaces = Vec::new();
    for entry in list_entries(workspace_storage).await? {
        if let Some(mtime) = modified(&entry.path).await {
            workspaces.push((mtime, entry));
        }
    }
    sort_newest_first(&mut workspaces);

    for (_, ws) in workspaces.into_iter().take(CURSOR_RECENT_WORKSPACES) {
        let db = ws.path.join(CURSOR_CHAT_DB);
        if is_file(&db).await {
            return Ok(Some(CursorWorkspace::ChatDatabase(db)));
        }
    }
    Ok(None)
}

/// Regular files in `dir` whose names end with `suffix`, sorted by name.
///
/// A missing directory yields an empty list.
pub async fn files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = list_entries(dir)
        .await?
        .into_iter()
        .filter(|e| !e.is_dir && e.name.ends_with(suffix))
        .collect::<Vec<_>>();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files.into_iter().map(|e| e.path).collect())
}

/// A directory entry with the bits the locators sort and filter on.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// List a directory. A missing directory is an empty listing, not an error.
async fn list_entries(dir: &Path) -> Result<Vec<Entry>, DiscoveryError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Directory does not exist: {:?}", dir);
            return Ok(Vec::new());
        }
        Err(e) => return Err(DiscoveryError::io(dir, e)),
    };

    let mut out = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DiscoveryError::io(dir, e))?
    {
        let path = entry.path();
        let is_dir = fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        out.push(Entry {
            name: entry.file_name().to_string_lossy().to_string(),
            path,
            is_dir,
        });
    }
    Ok(out)
}

async fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).await.ok()?.modified().ok()
}

pub(crate) async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

pub(crate) async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

fn sort_newest_first(items: &mut [(SystemTime, Entry)]) {
    items.sort_by(|(ta, a), (tb, b)| tb.cmp(ta).then_with(|| a.name.cmp(&b.name)));
}

fn newest(mut items: Vec<(SystemTime, Entry)>) -> Option<PathBuf> {
    sort_newest_first(&mut items);
    items.into_iter().next().map(|(_, e)| e.path)
}
