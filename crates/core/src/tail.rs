use std::collections::VecDeque;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ReadError;

/// Number of trailing session lines the session extractor looks at.
pub const DEFAULT_TAIL_LINES: usize = 500;

/// Read the last `limit` lines of a line-delimited file.
///
/// Streams the file front to back through a sliding window that holds at most
/// `2 * limit` lines; once the window overflows, the oldest `limit` lines are
/// dropped. The result is identical to reading every line and keeping the
/// last `limit`, but memory stays bounded for arbitrarily large session logs.
///
/// Lines are returned oldest first. `\r\n` endings are normalized, invalid
/// UTF-8 is replaced lossily, and a trailing newline at EOF does not produce
/// an empty last line.
pub async fn tail_lines(path: &Path, limit: usize) -> Result<Vec<String>, ReadError> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let file = File::open(path).await.map_err(|e| ReadError::io(path, e))?;
    let mut segments = BufReader::new(file).split(b'\n');

    let mut window: VecDeque<String> = VecDeque::with_capacity(limit * 2 + 1);
    while let Some(raw) = segments
        .next_segment()
        .await
        .map_err(|e| ReadError::io(path, e))?
    {
        window.push_back(decode_line(raw));
        if window.len() > limit * 2 {
            window.drain(..limit);
        }
    }

    let start = window.len().saturating_sub(limit);
    Ok(window.into_iter().skip(start).collect())
}

/// Read every line of a line-delimited file.
///
/// Used by the transcript compactor, which bounds its output by a character
/// budget rather than by the number of lines read.
pub async fn read_all_lines(path: &Path) -> Result<Vec<String>, ReadError> {
    let file = File::open(path).await.map_err(|e| ReadError::io(path, e))?;
    let mut segments = BufReader::new(file).split(b'\n');

    let mut lines = Vec::new();
    while let Some(raw) = segments
        .next_segment()
        .await
        .map_err(|e| ReadError::io(path, e))?
    {
        lines.push(decode_line(raw));
    }
    Ok(lines)
}

fn decode_line(mut raw: Vec<u8>) -> String {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    match String::from_utf8(raw) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn tail_0_lines_returns_empty() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "line1").unwrap();
        writeln!(f, "line2").unwrap();
        f.flush().unwrap();

        let result = tail_lines(f.path(), 0).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn tail_fewer_than_limit() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "alpha").unwrap();
        writeln!(f, "beta").unwrap();
        writeln!(f, "gamma").unwrap();
        f.flush().unwrap();

        let result = tail_lines(f.path(), 100).await.unwrap();
        assert_eq!(result, vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn tail_matches_full_read_then_slice() {
        let mut f = NamedTempFile::new().unwrap();
        for i in 0..10_000 {
            writeln!(f, "{{\"type\":\"user\",\"n\":{}}}", i).unwrap();
        }
        f.flush().unwrap();

        let tail = tail_lines(f.path(), 500).await.unwrap();
        let all = read_all_lines(f.path()).await.unwrap();

        assert_eq!(all.len(), 10_000);
        assert_eq!(tail.len(), 500);
        assert_eq!(tail.as_slice(), &all[all.len() - 500..]);
    }

    #[tokio::test]
    async fn tail_window_boundaries() {
        // Lengths just around 2 * limit exercise the trim step.
        for total in [9usize, 10, 11, 20, 21] {
            let mut f = NamedTempFile::new().unwrap();
            for i in 0..total {
                writeln!(f, "line{}", i).unwrap();
            }
            f.flush().unwrap();

            let result = tail_lines(f.path(), 5).await.unwrap();
            let expected: Vec<String> = (total - 5..total).map(|i| format!("line{}", i)).collect();
            assert_eq!(result, expected, "total = {}", total);
        }
    }

    #[tokio::test]
    async fn tail_empty_file() {
        let f = NamedTempFile::new().unwrap();
        let result = tail_lines(f.path(), 10).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn tail_no_trailing_newline() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "line1\nline2\nline3").unwrap();
        f.flush().unwrap();

        let result = tail_lines(f.path(), 2).await.unwrap();
        assert_eq!(result, vec!["line2", "line3"]);
    }

    #[tokio::test]
    async fn tail_crlf_endings() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "one\r\ntwo\r\n").unwrap();
        f.flush().unwrap();

        let result = tail_lines(f.path(), 5).await.unwrap();
        assert_eq!(result, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn tail_invalid_utf8_is_lossy() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"ok\n\xff\xfebad\n").unwrap();
        f.flush().unwrap();

        let result = tail_lines(f.path(), 5).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result[1].ends_with("bad"));
    }

    #[tokio::test]
    async fn tail_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = tail_lines(&dir.path().join("nope.jsonl"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::NotFound { .. }));
    }

    #[tokio::test]
    async fn read_all_keeps_every_line() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "a\n\nb\n").unwrap();
        f.flush().unwrap();

        let result = read_all_lines(f.path()).await.unwrap();
        assert_eq!(result, vec!["a", "", "b"]);
    }
}
