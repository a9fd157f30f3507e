use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

const MAX_FILENAME_CHARS: usize = 100;
const FALLBACK_TITLE: &str = "ChatGPT Conversation";

static TITLE_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-\s*ChatGPT\s*$").ok());
static TITLE: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("title").ok());
static HEADING: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("h1").ok());

/// Filesystem-safe name: line breaks and runs of `\ / : * ? " < > |` become a
/// space, whitespace collapses, and the result is capped at 100 characters.
/// Returns `fallback` when nothing is left.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_forbidden(c) { ' ' } else { c })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(MAX_FILENAME_CHARS).collect();
    let capped = capped.trim_end();
    if capped.is_empty() {
        fallback.to_string()
    } else {
        capped.to_string()
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\r' | '\n'
    )
}

/// Conversation title: the document title without its " - ChatGPT" suffix,
/// else the first `h1`, else a generic title.
pub fn chat_title(doc: &Html) -> String {
    let title = first_text(doc, &TITLE);
    let stripped = match TITLE_SUFFIX.as_ref() {
        Some(suffix) => suffix.replace(&title, "").trim().to_string(),
        None => title,
    };
    if !stripped.is_empty() {
        return stripped;
    }
    let heading = first_text(doc, &HEADING);
    if !heading.is_empty() {
        return heading;
    }
    FALLBACK_TITLE.to_string()
}

/// `<sanitized title>.txt` for the Q&A transcript.
pub fn qa_filename(doc: &Html) -> String {
    format!("{}.txt", sanitize_filename(&chat_title(doc), "chat"))
}

fn first_text(doc: &Html, selector: &Option<Selector>) -> String {
    selector
        .as_ref()
        .and_then(|selector| doc.select(selector).next())
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::{chat_title, sanitize_filename};

    #[test]
    fn forbidden_characters_become_spaces() {
        assert_eq!(
            sanitize_filename("Chapter 4: Polity/Rights?", "chat"),
            "Chapter 4 Polity Rights"
        );
        assert_eq!(sanitize_filename("a\r\nb", "chat"), "a b");
    }

    #[test]
    fn empty_names_use_fallback() {
        assert_eq!(sanitize_filename("  ?<>|  ", "chat"), "chat");
    }

    #[test]
    fn long_names_are_capped() {
        let long = "x".repeat(150);
        assert_eq!(sanitize_filename(&long, "chat").chars().count(), 100);
    }

    #[test]
    fn title_prefers_document_title_without_suffix() {
        let doc = Html::parse_document(
            "<html><head><title>Indian Polity - ChatGPT</title></head><body><h1>Other</h1></body></html>",
        );
        assert_eq!(chat_title(&doc), "Indian Polity");

        let doc = Html::parse_document(
            "<html><head><title>ChatGPT</title></head><body><h1> Fallback  heading </h1></body></html>",
        );
        assert_eq!(chat_title(&doc), "ChatGPT");

        let doc = Html::parse_document("<html><body><h1> Fallback  heading </h1></body></html>");
        assert_eq!(chat_title(&doc), "Fallback heading");

        let doc = Html::parse_document("<html><body></body></html>");
        assert_eq!(chat_title(&doc), "ChatGPT Conversation");
    }
}
