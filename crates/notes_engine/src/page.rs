//! The chat tab as seen by the page agent.
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::decode::{decode_page, DecodeError};
use crate::script;
use crate::selectors::ElementTarget;
use crate::types::PageError;

const MUTATION_CHANNEL_CAPACITY: usize = 64;

/// A live or saved chat page.
///
/// Implementations hand out serialized HTML rather than a parsed tree; callers
/// parse a fresh snapshot whenever they need to look at the page.
#[async_trait]
pub trait ChatPage: Send + Sync {
    async fn document_html(&self) -> Result<String, PageError>;

    /// Replace the content of the composer at `target` with `text`.
    async fn fill_input(&self, target: &ElementTarget, text: &str) -> Result<(), PageError>;

    async fn click(&self, target: &ElementTarget) -> Result<(), PageError>;

    /// Fires whenever the page's DOM changes.
    fn subscribe_mutations(&self) -> broadcast::Receiver<()>;
}

/// A saved page. Exports work; anything that would type or click fails.
pub struct SnapshotPage {
    html: String,
    mutations: broadcast::Sender<()>,
}

impl SnapshotPage {
    pub fn new(html: impl Into<String>) -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            html: html.into(),
            mutations,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let decoded = decode_page(bytes)?;
        Ok(Self::new(decoded.html))
    }
}

#[async_trait]
impl ChatPage for SnapshotPage {
    async fn document_html(&self) -> Result<String, PageError> {
        Ok(self.html.clone())
    }

    async fn fill_input(&self, _target: &ElementTarget, _text: &str) -> Result<(), PageError> {
        Err(PageError::ReadOnly)
    }

    async fn click(&self, _target: &ElementTarget) -> Result<(), PageError> {
        Err(PageError::ReadOnly)
    }

    fn subscribe_mutations(&self) -> broadcast::Receiver<()> {
        self.mutations.subscribe()
    }
}

/// Something that can run a JavaScript expression in the tab and return its
/// JSON value (a devtools session, a webview bridge, ...).
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError>;
}

/// A live page driven through a [`ScriptEvaluator`].
///
/// The host forwards DOM mutation notifications through
/// [`ScriptedPage::notify_mutation`].
pub struct ScriptedPage<E> {
    evaluator: E,
    mutations: broadcast::Sender<()>,
}

impl<E: ScriptEvaluator> ScriptedPage<E> {
    pub fn new(evaluator: E) -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            evaluator,
            mutations,
        }
    }

    pub fn notify_mutation(&self) {
        let _ = self.mutations.send(());
    }

    async fn run_on_element(&self, expression: &str) -> Result<(), PageError> {
        match self.evaluator.evaluate(expression).await? {
            Value::Bool(true) => Ok(()),
            _ => Err(PageError::Detached),
        }
    }
}

#[async_trait]
impl<E: ScriptEvaluator> ChatPage for ScriptedPage<E> {
    async fn document_html(&self) -> Result<String, PageError> {
        match self.evaluator.evaluate(script::document_html()).await? {
            Value::String(html) => Ok(html),
            other => Err(PageError::Script(format!(
                "expected document HTML, got {other}"
            ))),
        }
    }

    async fn fill_input(&self, target: &ElementTarget, text: &str) -> Result<(), PageError> {
        self.run_on_element(&script::fill_input(target, text)).await
    }

    async fn click(&self, target: &ElementTarget) -> Result<(), PageError> {
        self.run_on_element(&script::click(target)).await
    }

    fn subscribe_mutations(&self) -> broadcast::Receiver<()> {
        self.mutations.subscribe()
    }
}
