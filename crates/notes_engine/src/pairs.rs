//! Conversation structure: response nodes, user/assistant pairing and reply detection.
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::clean::{extract_clean_text, CleanOptions};
use crate::selectors::MESSAGE_CONTENT;

static RESPONSES: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse(".markdown").ok());
static MESSAGES: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("[data-message-author-role]").ok());
static ASSISTANT_MESSAGES: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(r#"[data-message-author-role="assistant"]"#).ok());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Rendered assistant responses, in document order.
pub fn response_elements(doc: &Html) -> Vec<ElementRef<'_>> {
    select_all(doc, &RESPONSES)
}

/// The content node inside a message wrapper, or the wrapper itself.
pub fn message_content(wrapper: ElementRef<'_>) -> ElementRef<'_> {
    MESSAGE_CONTENT.first_in(wrapper).unwrap_or(wrapper)
}

/// Pairs each assistant message with the latest unanswered user message.
///
/// Answers are scrubbed of citations unless that leaves nothing. Pairs with
/// an empty side are never emitted and a trailing question is dropped.
pub fn build_conversation_pairs(doc: &Html) -> Vec<QaPair> {
    let mut pairs = Vec::new();
    let mut pending_question: Option<String> = None;

    for wrapper in select_all(doc, &MESSAGES) {
        let content = message_content(wrapper);
        match wrapper.value().attr("data-message-author-role") {
            Some("user") => {
                let question = extract_clean_text(Some(content), CleanOptions::RAW);
                if !question.is_empty() {
                    pending_question = Some(question);
                }
            }
            Some("assistant") if pending_question.is_some() => {
                let mut answer = extract_clean_text(Some(content), CleanOptions::SCRUBBED);
                if answer.is_empty() {
                    answer = extract_clean_text(Some(content), CleanOptions::RAW);
                }
                if answer.is_empty() {
                    continue;
                }
                if let Some(question) = pending_question.take() {
                    pairs.push(QaPair { question, answer });
                }
            }
            _ => {}
        }
    }

    pairs
}

pub fn assistant_reply_count(doc: &Html) -> usize {
    select_all(doc, &ASSISTANT_MESSAGES).len()
}

/// Text of the newest assistant reply if more than `previous_count` replies
/// exist and the newest one has rendered text.
pub fn latest_reply(doc: &Html, previous_count: usize) -> Option<String> {
    let replies = select_all(doc, &ASSISTANT_MESSAGES);
    if replies.len() <= previous_count {
        return None;
    }
    let last = replies.last().copied()?;
    let text = extract_clean_text(Some(message_content(last)), CleanOptions::RAW);
    (!text.is_empty()).then_some(text)
}

fn select_all<'a>(doc: &'a Html, selector: &Option<Selector>) -> Vec<ElementRef<'a>> {
    selector
        .as_ref()
        .map(|selector| doc.select(selector).collect())
        .unwrap_or_default()
}
