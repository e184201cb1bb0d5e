// crates/core/src/synth.rs
//! Heuristic field synthesis from free-text assistant messages.
//!
//! Turns long prose into short, bounded lists using regex classification only.
//! No model is involved, so results are approximate, but the length bounds
//! and caps are fixed: downstream prompt templates rely on them.
//!
//! | Field | Window | Length bound | Cap |
//! |-------|--------|--------------|-----|
//! | decisions | last 10 messages | 20 < len < 300 | 10 |
//! | approaches | last 10 messages | 10 < len < 200 | 8 |
//! | current state | last message | ≤ 300 | 1 |
//! | next steps | last 5 messages | len > 5 | 8 |

use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Field caps and windows (keep in sync with the prompt templates).
pub mod limits {
    pub const DECISION_WINDOW: usize = 10;
    pub const MAX_DECISIONS: usize = 10;
    pub const DECISION_MIN_LEN: usize = 20;
    pub const DECISION_MAX_LEN: usize = 300;

    pub const APPROACH_WINDOW: usize = 10;
    pub const MAX_APPROACHES: usize = 8;
    pub const APPROACH_MIN_LEN: usize = 10;
    pub const APPROACH_MAX_LEN: usize = 200;

    pub const STATE_MAX_LEN: usize = 300;
    pub const STATE_LINE_MIN_LEN: usize = 20;

    pub const NEXT_STEP_WINDOW: usize = 5;
    pub const MAX_NEXT_STEPS: usize = 8;
    pub const NEXT_STEP_MIN_LEN: usize = 5;
}

/// Word stems that mark a sentence as a decision.
///
/// Matched case-insensitively at a word start. Shared by the session
/// synthesizer and the Antigravity plan/walkthrough parsers.
pub const DECISION_STEMS: &[&str] = &[
    "decid",
    "chos",
    "opt",
    "select",
    "prefer",
    "us(?:e|ing)",
    "going with",
    "approach",
    "architect",
    "pattern",
    "instead of",
];

static DECISION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({})", DECISION_STEMS.join("|")))
        .expect("decision stems form a valid regex")
});

static SENTENCE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

static APPROACH_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(?:tried|approach|attempted|tested|experimented with)\s+(.+?)(?:\.|$)")
            .expect("valid regex"),
        Regex::new(r"(?i)(?:first|then|alternatively|instead)\s*,?\s*(?:I|we|let's)\s+(.+?)(?:\.|$)")
            .expect("valid regex"),
    ]
});

static STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:currently|now|at this point|so far|status:?)\s*(.+?)(?:\.|$)")
        .expect("valid regex")
});

static NEXT_STEPS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:next steps?|todo|remaining|still need to|should also)\s*:?\s*\n?((?:\s*[-*\d.]+\s*.+\n?)+)",
    )
    .expect("valid regex")
});

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\-*\d.]+").expect("valid regex"));

/// True when `text` contains one of the [`DECISION_STEMS`].
pub fn is_decision_like(text: &str) -> bool {
    DECISION_RE.is_match(text)
}

/// Decision sentences from the last 10 messages.
pub fn extract_decisions(messages: &[String]) -> Vec<String> {
    let mut decisions = OrderedSet::default();

    for msg in last_n(messages, limits::DECISION_WINDOW) {
        for sentence in SENTENCE_SPLIT_RE.split(msg) {
            if !is_decision_like(sentence) {
                continue;
            }
            let cleaned = sentence.trim();
            let len = char_len(cleaned);
            if len > limits::DECISION_MIN_LEN && len < limits::DECISION_MAX_LEN {
                decisions.insert(cleaned);
            }
        }
    }

    decisions.into_capped(limits::MAX_DECISIONS)
}

/// "Tried X" / "then we Y" phrases from the last 10 messages.
pub fn extract_approaches(messages: &[String]) -> Vec<String> {
    let mut approaches = OrderedSet::default();

    for msg in last_n(messages, limits::APPROACH_WINDOW) {
        for pattern in APPROACH_RES.iter() {
            for m in pattern.find_iter(msg) {
                let a = m.as_str().trim();
                let len = char_len(a);
                if len > limits::APPROACH_MIN_LEN && len < limits::APPROACH_MAX_LEN {
                    approaches.insert(a);
                }
            }
        }
    }

    approaches.into_capped(limits::MAX_APPROACHES)
}

/// Where the work stands, read from the most recent message only.
///
/// Prefers an explicit status phrase; otherwise the message's last line that
/// carries more than 20 characters. Empty when nothing qualifies.
pub fn extract_state(messages: &[String]) -> String {
    let Some(last) = messages.last() else {
        return String::new();
    };

    if let Some(m) = STATE_RE.find(last) {
        return truncate_chars(m.as_str().trim(), limits::STATE_MAX_LEN);
    }

    last.lines()
        .filter(|l| char_len(l.trim()) > limits::STATE_LINE_MIN_LEN)
        .last()
        .map(|l| truncate_chars(l.trim(), limits::STATE_MAX_LEN))
        .unwrap_or_default()
}

/// List items that follow a "Next steps:" style header in the last 5 messages.
pub fn extract_next_steps(messages: &[String]) -> Vec<String> {
    let mut steps = OrderedSet::default();

    for msg in last_n(messages, limits::NEXT_STEP_WINDOW) {
        let Some(block) = NEXT_STEPS_RE.captures(msg).and_then(|c| c.get(1)) else {
            continue;
        };
        for line in block.as_str().split('\n') {
            let item = LIST_MARKER_RE.replace(line, "");
            let item = item.trim();
            if char_len(item) > limits::NEXT_STEP_MIN_LEN {
                steps.insert(item);
            }
        }
    }

    steps.into_capped(limits::MAX_NEXT_STEPS)
}

/// Insertion-ordered, exact-match deduplicating list.
#[derive(Debug, Default)]
pub(crate) struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    /// Adds `item` unless an identical string is already present.
    pub(crate) fn insert(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.items
    }

    pub(crate) fn into_capped(mut self, cap: usize) -> Vec<String> {
        self.items.truncate(cap);
        self.items
    }
}

fn last_n(messages: &[String], n: usize) -> &[String] {
    &messages[messages.len().saturating_sub(n)..]
}

/// Length in characters rather than bytes.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `max` characters of `s`, never splitting a code point.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// First line of `s`, trimmed.
pub(crate) fn first_line(s: &str) -> &str {
    s.split('\n').next().unwrap_or_default().trim()
}
