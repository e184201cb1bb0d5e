// crates/core/src/runner.rs
//! Fixed-priority dispatch over the editor extractors.

use std::path::Path;
use tracing::{debug, warn};

use crate::config::ExtractConfig;
use crate::extractors::{AntigravityExtractor, ClaudeCodeExtractor, CursorExtractor, SessionExtractor};
use crate::paths::StorageRoots;
use crate::types::ExtractedContext;

/// Tries each extractor in order and keeps the first result with a task.
pub struct ExtractionRunner {
    extractors: Vec<Box<dyn SessionExtractor>>,
}

impl ExtractionRunner {
    /// Claude Code, then Antigravity, then Cursor.
    pub fn new(roots: &StorageRoots) -> Self {
        Self::from_config(&ExtractConfig::new(roots.clone()))
    }

    pub fn from_config(config: &ExtractConfig) -> Self {
        let roots = &config.roots;
        Self::with_extractors(vec![
            Box::new(
                ClaudeCodeExtractor::new(&roots.claude_projects).with_tail_lines(config.tail_lines),
            ),
            Box::new(AntigravityExtractor::new(&roots.antigravity_brain)),
            Box::new(CursorExtractor::new(roots.cursor_workspace_storage())),
        ])
    }

    /// Custom ordered extractor list.
    pub fn with_extractors(extractors: Vec<Box<dyn SessionExtractor>>) -> Self {
        Self { extractors }
    }

    /// First accepted context for `repo_path`, or `None`.
    ///
    /// A failing extractor is logged and skipped, as is a result without a task.
    pub async fn run(&self, repo_path: &Path) -> Option<ExtractedContext> {
        for extractor in &self.extractors {
            match extractor.extract(repo_path).await {
                Ok(Some(ctx)) if ctx.has_task() => {
                    debug!(extractor = extractor.name(), source = %ctx.source, "Extractor matched");
                    return Some(ctx);
                }
                Ok(Some(_)) => {
                    debug!(extractor = extractor.name(), "Result had no task, skipping");
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(extractor = extractor.name(), error = %e, "Extractor failed");
                }
            }
        }
        None
    }
}

/// Context of the last coding session for `repo_path`, from whichever editor has one.
pub async fn extract_from_editor_sessions(
    repo_path: &Path,
    roots: &StorageRoots,
) -> Option<ExtractedContext> {
    ExtractionRunner::new(roots).run(repo_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, ReadError};
    use crate::types::ContextSource;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Outcome {
        Fail,
        Nothing,
        Task(&'static str),
    }

    struct Stub {
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    impl Stub {
        fn boxed(outcome: Outcome, calls: &Arc<AtomicUsize>) -> Box<dyn SessionExtractor> {
            Box::new(Self {
                outcome,
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl SessionExtractor for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn extract(&self, _repo: &Path) -> Result<Option<ExtractedContext>, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Fail => Err(ExtractError::Read(ReadError::NotFound {
                    path: PathBuf::from("/gone"),
                })),
                Outcome::Nothing => Ok(None),
                Outcome::Task(task) => {
                    let mut ctx = ExtractedContext::new(ContextSource::Antigravity);
                    ctx.task = task.to_string();
                    Ok(Some(ctx))
                }
            }
        }
    }

    #[tokio::test]
    async fn test_first_result_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = ExtractionRunner::with_extractors(vec![
            Stub::boxed(Outcome::Nothing, &calls),
            Stub::boxed(Outcome::Task("first"), &calls),
            Stub::boxed(Outcome::Task("second"), &calls),
        ]);
        let ctx = runner.run(Path::new("/repo")).await.unwrap();
        assert_eq!(ctx.task, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_and_empty_tasks_are_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = ExtractionRunner::with_extractors(vec![
            Stub::boxed(Outcome::Fail, &calls),
            Stub::boxed(Outcome::Task(""), &calls),
            Stub::boxed(Outcome::Task("recovered"), &calls),
        ]);
        let ctx = runner.run(Path::new("/repo")).await.unwrap();
        assert_eq!(ctx.task, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = ExtractionRunner::with_extractors(vec![
            Stub::boxed(Outcome::Fail, &calls),
            Stub::boxed(Outcome::Nothing, &calls),
        ]);
        assert!(runner.run(Path::new("/repo")).await.is_none());
        assert!(ExtractionRunner::with_extractors(Vec::new())
            .run(Path::new("/repo"))
            .await
            .is_none());
    }
}
