// crates/core/src/parser.rs
//! Decoding of individual Claude Code session-log lines.
//!
//! Each JSONL line is one event. Only the pieces the extractors need are
//! pulled out: the top-level `type`, the text of `message.content`, and any
//! `tool_use` blocks. Unknown event types are kept as [`EntryKind::Other`] so
//! callers can ignore them without failing the scan.

use serde_json::Value;
use tracing::debug;

/// Top-level `type` of a session-log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    Progress,
    Other,
}

impl EntryKind {
    fn from_type(t: Option<&str>) -> Self {
        match t {
            Some("user") => Self::User,
            Some("assistant") => Self::Assistant,
            Some("progress") => Self::Progress,
            _ => Self::Other,
        }
    }
}

/// A `tool_use` content block.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUse {
    pub name: String,
    pub input: Value,
}

/// One decoded session-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub kind: EntryKind,
    /// Plain string content, or the `text` blocks joined with `\n`.
    pub text: String,
    pub tool_uses: Vec<ToolUse>,
}

/// Decode one JSONL line. Returns `None` for lines that are not valid JSON.
pub fn parse_line(line: &str) -> Option<RawMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            debug!("Skipping malformed session line: {}", e);
            return None;
        }
    };

    let kind = EntryKind::from_type(value.get("type").and_then(Value::as_str));
    let content = value.get("message").and_then(|m| m.get("content"));

    Some(RawMessage {
        kind,
        text: content.map(content_text).unwrap_or_default(),
        tool_uses: content.map(tool_uses).unwrap_or_default(),
    })
}

/// Text of a `message.content` value.
///
/// Strings are returned as-is; block arrays contribute only their
/// `type: "text"` blocks, joined with newlines.
pub fn content_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn tool_uses(content: &Value) -> Vec<ToolUse> {
    let Some(blocks) = content.as_array() else {
        return Vec::new();
    };
    blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("tool_use"))
        .map(|b| ToolUse {
            name: b
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            input: b
                .get("input")
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_content() {
        let msg = parse_line(r#"{"type":"user","message":{"content":"Fix the bug"}}"#).unwrap();
        assert_eq!(msg.kind, EntryKind::User);
        assert_eq!(msg.text, "Fix the bug");
        assert!(msg.tool_uses.is_empty());
    }

    #[test]
    fn test_parse_block_content_keeps_text_only() {
        let line = r#"{"type":"assistant","message":{"content":[
            {"type":"text","text":"Let me read it"},
            {"type":"tool_use","name":"Read","input":{"file_path":"/src/main.rs"}},
            {"type":"thinking","thinking":"hmm"},
            {"type":"text","text":"Done"}
        ]}}"#
            .replace('\n', "");
        let msg = parse_line(&line).unwrap();
        assert_eq!(msg.kind, EntryKind::Assistant);
        assert_eq!(msg.text, "Let me read it\nDone");
        assert_eq!(msg.tool_uses.len(), 1);
        assert_eq!(msg.tool_uses[0].name, "Read");
        assert_eq!(msg.tool_uses[0].input, json!({"file_path": "/src/main.rs"}));
    }

    #[test]
    fn test_parse_malformed_line() {
        assert!(parse_line("{not json").is_none());
        assert!(parse_line("   ").is_none());
    }

    #[test]
    fn test_parse_unknown_type_and_missing_message() {
        let msg = parse_line(r#"{"type":"summary","summary":"x"}"#).unwrap();
        assert_eq!(msg.kind, EntryKind::Other);
        assert!(msg.text.is_empty());

        let msg = parse_line(r#"{"type":"progress"}"#).unwrap();
        assert_eq!(msg.kind, EntryKind::Progress);
    }

    #[test]
    fn test_tool_use_without_input() {
        let msg =
            parse_line(r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"TodoWrite"}]}}"#)
                .unwrap();
        assert_eq!(msg.tool_uses[0].input, json!({}));
    }
}
