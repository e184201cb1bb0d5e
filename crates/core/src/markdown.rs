//! Small markdown scanners for planning and checklist artifacts.
//!
//! These are line-oriented regex helpers, not a markdown parser. A section
//! body runs from the end of its heading line to the first boundary (usually
//! the next `##` heading) or to the end of the document.

use regex_lite::Regex;
use std::sync::LazyLock;

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("valid regex"));

static IN_PROGRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)-\s+\[[/-]\]\s+(.+)$").expect("valid regex"));

static COMPLETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)-\s+\[x\]\s+(.+)$").expect("valid regex"));

static INCOMPLETE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)-\s+\[\s\]\s+(.+)$").expect("valid regex"));

static BULLET_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s*").expect("valid regex"));

/// Boundary used by most sections: the next `##` (or deeper) heading.
pub const NEXT_H2: &str = "\n##";

/// Text of the first level-1 heading, trimmed. Blank titles count as absent.
pub fn h1_title(content: &str) -> Option<String> {
    H1_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Body of the first section whose heading matches `heading`.
///
/// `heading` must consume the heading line including its newline. The body
/// ends right before the first occurrence of `boundary` or at end of input.
pub fn section_body<'a>(content: &'a str, heading: &Regex, boundary: &str) -> Option<&'a str> {
    let m = heading.find(content)?;
    let rest = &content[m.end()..];
    let end = rest.find(boundary).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Like [`section_body`], but the boundary is itself a pattern.
pub fn section_body_until<'a>(
    content: &'a str,
    heading: &Regex,
    boundary: &Regex,
) -> Option<&'a str> {
    let m = heading.find(content)?;
    let rest = &content[m.end()..];
    let end = boundary.find(rest).map(|b| b.start()).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Non-empty lines of a trimmed section body.
pub fn body_lines(body: &str) -> impl Iterator<Item = &str> {
    body.trim().split('\n').filter(|l| !l.is_empty())
}

/// Strip a leading `-` / `*` list marker and surrounding whitespace.
pub fn strip_bullet(line: &str) -> String {
    BULLET_PREFIX_RE.replace(line, "").trim().to_string()
}

/// First checklist item marked in progress (`- [/]` or `- [-]`).
pub fn in_progress_item(content: &str) -> Option<String> {
    IN_PROGRESS_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Every `- [x]` item, in file order.
pub fn completed_items(content: &str) -> Vec<String> {
    capture_all(&COMPLETED_RE, content)
}

/// Every `- [ ]` item, in file order.
pub fn incomplete_items(content: &str) -> Vec<String> {
    capture_all(&INCOMPLETE_RE, content)
}

fn capture_all(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK: &str = "# Fix Header Overflow\n- [x] Analyze bug\n- [/] Write fix\n- [x] Create reproduction\n- [ ] Implement fix\n- [ ] Verify on mobile\n";

    #[test]
    fn test_h1_title() {
        assert_eq!(h1_title(TASK).as_deref(), Some("Fix Header Overflow"));
        assert_eq!(h1_title("## Only h2\ntext"), None);
        assert_eq!(h1_title("intro\n#   Spaced  \n"), Some("Spaced".to_string()));
    }

    #[test]
    fn test_checklists() {
        assert_eq!(completed_items(TASK), vec!["Analyze bug", "Create reproduction"]);
        assert_eq!(incomplete_items(TASK), vec!["Implement fix", "Verify on mobile"]);
        assert_eq!(in_progress_item(TASK).as_deref(), Some("Write fix"));
        assert_eq!(in_progress_item("- [-] Dash style").as_deref(), Some("Dash style"));
        assert_eq!(in_progress_item("- [x] done"), None);
    }

    #[test]
    fn test_checklists_crlf() {
        let content = "- [x] One\r\n- [ ] Two\r\n";
        assert_eq!(completed_items(content), vec!["One"]);
        assert_eq!(incomplete_items(content), vec!["Two"]);
    }

    #[test]
    fn test_section_body() {
        let heading = Regex::new(r"(?i)##\s*Conventions?\s*\n").unwrap();
        let doc = "# Memory\n\n## Conventions\n- Use tabs\n- Snake case\n\n## Patterns\n- Builder\n";
        assert_eq!(
            section_body(doc, &heading, NEXT_H2),
            Some("- Use tabs\n- Snake case\n")
        );

        let last = "## Convention\n- only one";
        assert_eq!(section_body(last, &heading, NEXT_H2), Some("- only one"));
        assert_eq!(section_body("no sections", &heading, NEXT_H2), None);
    }

    #[test]
    fn test_section_body_until_pattern() {
        let heading = Regex::new(r"(?i)#{2,4}\s*Changes\s*\n").unwrap();
        let boundary = Regex::new(r"\n#{2,4} ").unwrap();
        let doc = "### Changes\n- a\n##### deep stays\n- b\n## Next\n";
        assert_eq!(
            section_body_until(doc, &heading, &boundary),
            Some("- a\n##### deep stays\n- b")
        );
    }

    #[test]
    fn test_body_lines_and_strip_bullet() {
        let lines: Vec<&str> = body_lines("\n- one\n\n* two\n").collect();
        assert_eq!(lines, vec!["- one", "* two"]);
        assert_eq!(strip_bullet("-   one "), "one");
        assert_eq!(strip_bullet("* two"), "two");
        assert_eq!(strip_bullet("plain"), "plain");
    }
}
