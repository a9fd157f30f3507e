//! Export documents: the styled notes page and the pipe-delimited Q&A transcript.
use scraper::ElementRef;

use crate::clean::{CleanOptions, CleanedFragment};
use crate::pairs::QaPair;

const NOTES_TEMPLATE: &str = include_str!("../assets/notes_template.html");
const GENERATED_AT_MARKER: &str = "{{generated_at}}";
const CONTENT_MARKER: &str = "{{content}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesDocument {
    /// Self-contained HTML page with a "Copy All" button.
    pub html: String,
    /// Text of every non-empty response, separated by blank lines.
    pub plain_text: String,
}

pub fn build_notes_document(responses: &[ElementRef<'_>], generated_at: &str) -> NotesDocument {
    let mut text_sections = Vec::new();
    let mut markup_sections = Vec::new();

    for response in responses {
        let fragment = CleanedFragment::new(*response, CleanOptions::SCRUBBED);
        let text = fragment.inner_text();
        if !text.is_empty() {
            text_sections.push(text);
        }
        let markup = fragment.inner_html();
        let markup = markup.trim();
        if !markup.is_empty() {
            markup_sections.push(markup.to_string());
        }
    }

    NotesDocument {
        html: render_notes_page(&markup_sections.join("\n\n"), generated_at),
        plain_text: text_sections.join("\n\n"),
    }
}

fn render_notes_page(content: &str, generated_at: &str) -> String {
    let page = NOTES_TEMPLATE.replacen(GENERATED_AT_MARKER, &escape_text(generated_at), 1);
    match page.split_once(CONTENT_MARKER) {
        Some((head, tail)) => format!("{head}{content}{tail}"),
        None => page,
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Joins all whitespace-separated words of `text` with single spaces.
pub fn collapse_to_single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One `question | answer` line per pair, each side on a single line.
pub fn build_qa_text(pairs: &[QaPair]) -> String {
    pairs
        .iter()
        .map(|pair| {
            format!(
                "{} | {}",
                collapse_to_single_line(&pair.question),
                collapse_to_single_line(&pair.answer)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
