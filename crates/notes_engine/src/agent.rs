//! The page-resident agent: answers popup requests against one chat page.
use std::fmt;
use std::sync::Arc;

use notes_core::{PageAction, PageRequest, PageResponse, RequestId, RuntimeMessage};
use notes_logging::{notes_info, notes_warn};
use scraper::Html;

use crate::document::{build_notes_document, build_qa_text, NotesDocument};
use crate::driver::{BulkDriver, BulkHandle};
use crate::filename::qa_filename;
use crate::page::ChatPage;
use crate::pairs::{build_conversation_pairs, response_elements};
use crate::scratch::{ScratchStore, NOTES_HTML_KEY, NOTES_MD_KEY, NOTES_QNA_KEY, NOTES_TEXT_KEY};
use crate::types::{DriverSettings, MessageSink};

pub const NO_RESPONSES: &str = "No ChatGPT responses were found on this page.";
pub const NO_PAIRS: &str = "No question/answer pairs were detected in this chat.";
pub const NO_QUESTIONS: &str = "No questions provided.";

const HTML_MIME: &str = "text/html";
const TEXT_MIME: &str = "text/plain";

/// Produces the "Saved on ..." stamp of the notes page.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct AgentConfig {
    pub driver: DriverSettings,
    pub clock: Clock,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            driver: DriverSettings::default(),
            clock: Arc::new(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

pub struct PageAgent {
    page: Arc<dyn ChatPage>,
    clock: Clock,
    outbox: Arc<dyn MessageSink>,
    scratch: Arc<dyn ScratchStore>,
    bulk: BulkHandle,
}

impl PageAgent {
    /// Attach to `page`, starting its bulk driver on the current tokio runtime.
    pub fn attach(
        page: Arc<dyn ChatPage>,
        config: AgentConfig,
        outbox: Arc<dyn MessageSink>,
        scratch: Arc<dyn ScratchStore>,
    ) -> Self {
        let bulk = BulkDriver::spawn(Arc::clone(&page), config.driver, Arc::clone(&outbox));
        Self {
            page,
            clock: config.clock,
            outbox,
            scratch,
            bulk,
        }
    }

    pub async fn handle(&self, request: PageRequest) -> PageResponse {
        match request {
            PageRequest::CollectNotes => self.collect_notes().await,
            PageRequest::GenerateQa => self.generate_qa().await,
            PageRequest::BulkQuestions { questions } => self.queue_questions(questions).await,
        }
    }

    async fn collect_notes(&self) -> PageResponse {
        let html = match self.page.document_html().await {
            Ok(html) => html,
            Err(err) => return PageResponse::failure(err.to_string()),
        };
        let generated_at = (self.clock)();
        let Some(notes) = render_notes(&html, &generated_at) else {
            return PageResponse::failure(NO_RESPONSES);
        };

        self.remember(NOTES_MD_KEY, &notes.plain_text);
        self.remember(NOTES_TEXT_KEY, &notes.plain_text);
        self.remember(NOTES_HTML_KEY, &notes.html);

        let filename = PageAction::CollectNotes.default_filename();
        self.save(notes.html, HTML_MIME, filename, new_request_id("notes"))
    }

    async fn generate_qa(&self) -> PageResponse {
        let html = match self.page.document_html().await {
            Ok(html) => html,
            Err(err) => return PageResponse::failure(err.to_string()),
        };
        let Some((filename, transcript)) = render_qa(&html) else {
            return PageResponse::failure(NO_PAIRS);
        };

        self.remember(NOTES_QNA_KEY, &transcript);
        self.save(transcript, TEXT_MIME, &filename, new_request_id("qa"))
    }

    async fn queue_questions(&self, questions: Vec<String>) -> PageResponse {
        match self.bulk.enqueue(questions).await {
            Ok(0) => PageResponse::failure(NO_QUESTIONS),
            Ok(added) => PageResponse::enqueued(added),
            Err(err) => PageResponse::failure(err.to_string()),
        }
    }

    fn save(&self, content: String, mime: &str, filename: &str, request_id: RequestId) -> PageResponse {
        notes_info!("Requesting save of {filename} ({request_id})");
        self.outbox.post(RuntimeMessage::SaveFile {
            content,
            mime_type: mime.to_string(),
            filename: filename.to_string(),
            request_id: request_id.clone(),
        });
        PageResponse::saving(filename, request_id)
    }

    fn remember(&self, key: &str, value: &str) {
        if let Err(err) = self.scratch.set(key, value) {
            notes_warn!("Could not store {key} in scratch space: {err}");
        }
    }
}

fn render_notes(html: &str, generated_at: &str) -> Option<NotesDocument> {
    let doc = Html::parse_document(html);
    let responses = response_elements(&doc);
    if responses.is_empty() {
        return None;
    }
    Some(build_notes_document(&responses, generated_at))
}

fn render_qa(html: &str) -> Option<(String, String)> {
    let doc = Html::parse_document(html);
    let pairs = build_conversation_pairs(&doc);
    if pairs.is_empty() {
        return None;
    }
    Some((qa_filename(&doc), build_qa_text(&pairs)))
}

/// `<prefix>-<uuid v4>`
pub fn new_request_id(prefix: &str) -> RequestId {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}
