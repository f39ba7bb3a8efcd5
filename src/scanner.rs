//! Detection of remote image references in Markdown content.
//!
//! The scanner walks a note's text once and reports every Markdown image
//! construct whose target is an `http://` or `https://` URL, along with the
//! byte offsets of the whole construct. Offsets are only meaningful against
//! the exact content string that was scanned; any edit invalidates them.

use std::sync::LazyLock;

use regex::Regex;

/// Matches `![alt](http://…)` / `![alt](https://…)`. Alt text may not contain
/// `]`, the URL may not contain `)`, so matches never overlap.
static REMOTE_IMAGE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\((https?://[^)]+)\)").expect("remote image pattern is valid"));

/// One remote image reference found in a note.
///
/// `start`/`end` are byte offsets into the scanned content; `[start, end)`
/// spans the entire `![alt](url)` construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
  /// The remote URL inside the parentheses.
  pub url: String,
  /// Byte offset of the leading `!`.
  pub start: usize,
  /// Byte offset one past the closing `)`.
  pub end: usize,
}

/// Scan note content for remote image references.
///
/// Returns references in left-to-right order of appearance. The URL is not
/// validated beyond its scheme prefix; deeper validation happens before any
/// download is attempted.
pub fn scan(content: &str) -> Vec<ImageReference> {
  REMOTE_IMAGE
    .captures_iter(content)
    .map(|captures| {
      let whole = captures.get(0).expect("match always has a full capture");
      let url = captures.get(1).expect("pattern always captures a URL");
      ImageReference {
        url: url.as_str().to_string(),
        start: whole.start(),
        end: whole.end(),
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_scan_empty_content() {
    assert!(scan("").is_empty());
  }

  #[test]
  fn test_scan_no_remote_images() {
    let content = "# Notes\n\nA [link](https://example.com) and a local image ![x](assets/x.png).";
    assert!(scan(content).is_empty());
  }

  #[test]
  fn test_scan_single_reference_offsets() {
    let content = "before ![alt](https://example.com/a.png) after";
    let refs = scan(content);

    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].url, "https://example.com/a.png");
    // Re-slicing at the reported offsets reproduces the matched construct.
    assert_eq!(&content[refs[0].start..refs[0].end], "![alt](https://example.com/a.png)");
  }

  #[test]
  fn test_scan_http_and_https() {
    let content = "![a](http://x.test/a.png) ![b](https://x.test/b.png)";
    let refs = scan(content);

    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].url, "http://x.test/a.png");
    assert_eq!(refs[1].url, "https://x.test/b.png");
  }

  #[test]
  fn test_scan_left_to_right_order() {
    let content = "![1](https://x.test/1.png)\ntext\n![2](https://x.test/2.png)\n![3](https://x.test/3.png)";
    let refs = scan(content);

    assert_eq!(refs.len(), 3);
    assert!(refs[0].start < refs[1].start && refs[1].start < refs[2].start);
    // Non-overlapping by construction.
    assert!(refs[0].end <= refs[1].start && refs[1].end <= refs[2].start);
  }

  #[test]
  fn test_scan_empty_alt_text() {
    let refs = scan("![](https://x.test/pic.jpg)");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].url, "https://x.test/pic.jpg");
  }

  #[test]
  fn test_scan_skips_unbalanced_brackets() {
    // No closing bracket before the parenthesis, so nothing qualifies.
    assert!(scan("![broken(https://x.test/a.png)").is_empty());
  }

  #[test]
  fn test_scan_skips_non_http_schemes() {
    assert!(scan("![f](file:///tmp/a.png) ![d](data:image/png;base64,AAAA)").is_empty());
  }

  #[test]
  fn test_scan_multibyte_surroundings() {
    let content = "笔记 ![图](https://x.test/图.png) 结束";
    let refs = scan(content);

    assert_eq!(refs.len(), 1);
    assert_eq!(&content[refs[0].start..refs[0].end], "![图](https://x.test/图.png)");
  }
}
