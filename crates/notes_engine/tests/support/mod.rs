#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use notes_core::{BulkStatus, RuntimeMessage};
use notes_engine::{ChatPage, ElementTarget, PageError};
use tokio::sync::{broadcast, mpsc};

#[derive(Default)]
struct Conversation {
    turns: Vec<(&'static str, String)>,
    draft: Option<String>,
    fills: Vec<String>,
    clicks: usize,
}

/// An in-memory chat page. Clicking send moves the draft into a user turn
/// and, when configured, appends an assistant reply after a delay.
pub struct FakePage {
    title: String,
    has_composer: bool,
    has_send_button: bool,
    reply_after: Option<Duration>,
    conversation: Arc<Mutex<Conversation>>,
    mutations: broadcast::Sender<()>,
}

impl FakePage {
    pub fn new() -> Self {
        let (mutations, _) = broadcast::channel(16);
        Self {
            title: "Test chat - ChatGPT".into(),
            has_composer: true,
            has_send_button: true,
            reply_after: None,
            conversation: Arc::new(Mutex::new(Conversation::default())),
            mutations,
        }
    }

    pub fn replying_after(mut self, delay: Duration) -> Self {
        self.reply_after = Some(delay);
        self
    }

    pub fn without_composer(mut self) -> Self {
        self.has_composer = false;
        self
    }

    pub fn without_send_button(mut self) -> Self {
        self.has_send_button = false;
        self
    }

    pub fn fills(&self) -> Vec<String> {
        self.conversation.lock().unwrap().fills.clone()
    }

    pub fn clicks(&self) -> usize {
        self.conversation.lock().unwrap().clicks
    }

    pub fn assistant_turns(&self) -> Vec<String> {
        self.conversation
            .lock()
            .unwrap()
            .turns
            .iter()
            .filter(|(role, _)| *role == "assistant")
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatPage for FakePage {
    async fn document_html(&self) -> Result<String, PageError> {
        let conversation = self.conversation.lock().unwrap();
        let mut body = String::new();
        for (role, text) in &conversation.turns {
            let inner = if *role == "assistant" {
                format!(r#"<div class="markdown"><p>{text}</p></div>"#)
            } else {
                format!(r#"<div class="whitespace-pre-wrap">{text}</div>"#)
            };
            body.push_str(&format!(
                r#"<div data-message-author-role="{role}">{inner}</div>"#
            ));
        }
        if self.has_composer {
            body.push_str(r#"<div id="prompt-textarea" contenteditable="true"></div>"#);
        }
        if self.has_send_button {
            body.push_str(r#"<button data-testid="send-button">Send</button>"#);
        }
        Ok(format!(
            "<html><head><title>{}</title></head><body>{body}</body></html>",
            self.title
        ))
    }

    async fn fill_input(&self, target: &ElementTarget, text: &str) -> Result<(), PageError> {
        assert_eq!(target.selector, "#prompt-textarea");
        let mut conversation = self.conversation.lock().unwrap();
        conversation.fills.push(text.to_string());
        conversation.draft = Some(text.to_string());
        Ok(())
    }

    async fn click(&self, target: &ElementTarget) -> Result<(), PageError> {
        assert_eq!(target.selector, r#"button[data-testid="send-button"]"#);
        let question = {
            let mut conversation = self.conversation.lock().unwrap();
            conversation.clicks += 1;
            let question = conversation.draft.take().unwrap_or_default();
            conversation.turns.push(("user", question.clone()));
            question
        };
        let _ = self.mutations.send(());

        if let Some(delay) = self.reply_after {
            let conversation = Arc::clone(&self.conversation);
            let mutations = self.mutations.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                conversation
                    .lock()
                    .unwrap()
                    .turns
                    .push(("assistant", format!("Answer to {question}")));
                let _ = mutations.send(());
            });
        }
        Ok(())
    }

    fn subscribe_mutations(&self) -> broadcast::Receiver<()> {
        self.mutations.subscribe()
    }
}

/// Bulk statuses received up to and including the first `complete`/`error`.
pub async fn statuses_until_terminal(
    rx: &mut mpsc::UnboundedReceiver<RuntimeMessage>,
) -> Vec<BulkStatus> {
    let mut statuses = Vec::new();
    while let Some(message) = rx.recv().await {
        if let RuntimeMessage::BulkStatus(status) = message {
            let done = status.is_terminal();
            statuses.push(status);
            if done {
                break;
            }
        }
    }
    statuses
}
