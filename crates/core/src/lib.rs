// crates/core/src/lib.rs
//! Coding-session context extraction from editor storage.
//!
//! Reads what Claude Code, Antigravity and Cursor leave on disk and turns it
//! into an [`ExtractedContext`], or into a compacted transcript for
//! summarization.
pub mod config;
pub mod discovery;
pub mod error;
pub mod extractors;
pub mod markdown;
pub mod parser;
pub mod paths;
pub mod runner;
pub mod synth;
pub mod tail;
pub mod transcript;
pub mod types;

pub use config::ExtractConfig;
pub use error::*;
pub use extractors::SessionExtractor;
pub use paths::StorageRoots;
pub use runner::{extract_from_editor_sessions, ExtractionRunner};
pub use transcript::{extract_full_transcript, TranscriptCompactor};
pub use types::*;
