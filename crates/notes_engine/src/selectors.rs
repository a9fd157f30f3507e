//! Ordered selector fallbacks for the parts of the chat page we interact with.
use std::sync::LazyLock;

use notes_logging::notes_warn;
use scraper::{ElementRef, Html, Selector};

pub const MESSAGE_CONTENT_SELECTORS: &[&str] = &[
    ".markdown",
    r#"[data-message-content="true"]"#,
    r#"[data-testid="markdown"]"#,
    ".prose",
    ".whitespace-pre-wrap",
    "article",
];

pub const COMPOSER_SELECTORS: &[&str] = &[
    "#prompt-textarea",
    r#"[data-testid="conversation-turn-composer-textarea"]"#,
    ".ProseMirror",
    r#"[contenteditable="true"][data-virtualkeyboard="true"]"#,
    "textarea",
];

pub const SEND_BUTTON_SELECTORS: &[&str] = &[
    r#"button[data-testid="send-button"]"#,
    "#composer-submit-button",
    r#"button[aria-label="Send message"]"#,
    r#"button[aria-label="Send"]"#,
    r#"button[type="submit"]"#,
];

pub(crate) static MESSAGE_CONTENT: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(MESSAGE_CONTENT_SELECTORS));
pub(crate) static COMPOSER: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(COMPOSER_SELECTORS));
pub(crate) static SEND_BUTTON: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(SEND_BUTTON_SELECTORS));

/// An element on the live page, addressed by the selector whose first
/// document match it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTarget {
    pub selector: String,
}

impl ElementTarget {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

/// Candidate selectors tried in order; the first one with a match wins.
pub struct SelectorChain {
    candidates: Vec<(&'static str, Selector)>,
}

impl SelectorChain {
    pub fn new(candidates: &[&'static str]) -> Self {
        let candidates = candidates
            .iter()
            .filter_map(|css| match Selector::parse(css) {
                Ok(selector) => Some((*css, selector)),
                Err(err) => {
                    notes_warn!("Skipping invalid selector {css:?}: {err}");
                    None
                }
            })
            .collect();
        Self { candidates }
    }

    /// First descendant of `scope` matched by the earliest matching candidate.
    pub fn first_in<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.candidates
            .iter()
            .find_map(|(_, selector)| scope.select(selector).next())
    }

    pub fn first_target(&self, doc: &Html) -> Option<ElementTarget> {
        self.candidates
            .iter()
            .find(|(_, selector)| doc.select(selector).next().is_some())
            .map(|(css, _)| ElementTarget::new(*css))
    }
}

/// The page's text input widget.
pub fn find_composer(doc: &Html) -> Option<ElementTarget> {
    COMPOSER.first_target(doc)
}

/// The control that submits the composer.
pub fn find_send_button(doc: &Html) -> Option<ElementTarget> {
    SEND_BUTTON.first_target(doc)
}
