//! Text helpers for building contact descriptions

use scraper::{ElementRef, Html};

/// Elements whose text never reaches a reader
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Longest description kept from surrounding text
pub const SNIPPET_MAX_CHARS: usize = 140;

/// Characters of context taken on each side of a free-text match
pub const CONTEXT_WINDOW_CHARS: usize = 90;

/// Returns the document's visible text, one space between text nodes
pub fn visible_text(document: &Html) -> String {
    let mut parts = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| HIDDEN_TAGS.contains(&el.value().name()));
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

/// Text of one element, trimmed pieces joined by a space
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace and caps the snippet at [`SNIPPET_MAX_CHARS`]
pub fn trim_snippet(snippet: &str, value: &str) -> String {
    let cleaned = collapse_whitespace(snippet);

    if cleaned.chars().count() > SNIPPET_MAX_CHARS {
        let cut: String = cleaned.chars().take(SNIPPET_MAX_CHARS - 3).collect();
        return format!("{}...", cut.trim_end());
    }

    if cleaned.is_empty() {
        format!("Found in {}", value)
    } else {
        cleaned
    }
}

/// Description built from the text around a match at `start..end` (byte offsets)
pub fn context_window(text: &str, start: usize, end: usize, value: &str) -> String {
    let window_start = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_WINDOW_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);

    let window_end = text[end..]
        .char_indices()
        .nth(CONTEXT_WINDOW_CHARS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    trim_snippet(text[window_start..window_end].trim(), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_scripts() {
        let html = Html::parse_document(
            r#"<html><head><title>Acme</title><style>p { color: red }</style></head><body><p> Hello world </p><script>var x = "a@b.com";</script><div>Bye</div></body></html>"#,
        );
        assert_eq!(visible_text(&html), "Acme Hello world Bye");
    }

    #[test]
    fn test_trim_snippet_caps_length() {
        let long = "word ".repeat(60);
        let trimmed = trim_snippet(&long, "x");
        assert_eq!(trimmed.chars().count(), 140);
        assert!(trimmed.ends_with("..."));
    }

    #[test]
    fn test_trim_snippet_fallback() {
        assert_eq!(trim_snippet("   ", "a@b.com"), "Found in a@b.com");
        assert_eq!(trim_snippet("  Sales\n team ", "a@b.com"), "Sales team");
    }

    #[test]
    fn test_context_window_is_char_based() {
        let prefix = "é".repeat(100);
        let text = format!("{} mail x@y.com {}", prefix, "ü".repeat(100));
        let start = text.find("x@y.com").unwrap();
        let end = start + "x@y.com".len();

        let snippet = context_window(&text, start, end, "x@y.com");
        assert!(snippet.contains("x@y.com") || snippet.ends_with("..."));
        assert!(snippet.chars().count() <= SNIPPET_MAX_CHARS);
    }

    #[test]
    fn test_context_window_short_text() {
        let text = "Write to info@acme.io today";
        let start = text.find("info").unwrap();
        let snippet = context_window(text, start, start + 12, "info@acme.io");
        assert_eq!(snippet, "Write to info@acme.io today");
    }
}
