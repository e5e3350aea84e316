//! Locates the fenced Mermaid block inside a free-form model completion.

use regex::Regex;
use std::sync::OnceLock;

fn mermaid_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // (?s) so the body may span lines; .*? keeps the match at the first
    // closing fence.
    RE.get_or_init(|| Regex::new(r"(?s)```mermaid\n(.*?)\n```").expect("valid regex"))
}

/// Extract the inner content of the first ```mermaid fenced block, with
/// the delimiting newlines stripped. Returns `None` when no complete
/// fence is present (including an opening fence with no closing pair).
/// First-match policy: later fences are ignored.
pub fn extract_mermaid(text: &str) -> Option<&str> {
    mermaid_fence()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fenced_block() {
        let text = "pre ```mermaid\nA-->B\n``` post";
        assert_eq!(extract_mermaid(text), Some("A-->B"));
    }

    #[test]
    fn test_multiline_body() {
        let text = "```mermaid\nflowchart TD\n  A --> B\n  B --> C\n```";
        assert_eq!(extract_mermaid(text), Some("flowchart TD\n  A --> B\n  B --> C"));
    }

    #[test]
    fn test_no_fence_returns_none() {
        assert_eq!(extract_mermaid("just prose, no diagram"), None);
    }

    #[test]
    fn test_wrong_language_tag_returns_none() {
        assert_eq!(extract_mermaid("```python\nprint(1)\n```"), None);
    }

    #[test]
    fn test_first_of_two_fences_wins() {
        let text = "```mermaid\nfirst\n```\nmore\n```mermaid\nsecond\n```";
        assert_eq!(extract_mermaid(text), Some("first"));
    }

    #[test]
    fn test_unclosed_fence_returns_none() {
        assert_eq!(extract_mermaid("```mermaid\nA-->B"), None);
    }

    #[test]
    fn test_content_is_bit_for_bit() {
        let body = "flowchart LR\n  A[\"weird  spacing\"]   -->|label| B";
        let text = format!("intro\n```mermaid\n{}\n```\noutro", body);
        assert_eq!(extract_mermaid(&text), Some(body));
    }
}
