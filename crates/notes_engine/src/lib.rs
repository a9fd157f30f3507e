//! Chat notes engine: page parsing, exports, the bulk question driver and the
//! download relay.
mod agent;
mod clean;
mod decode;
mod document;
mod driver;
mod filename;
mod page;
mod pairs;
mod persist;
mod relay;
mod scratch;
mod script;
mod selectors;
mod text;
mod types;

pub use agent::{new_request_id, AgentConfig, Clock, PageAgent, NO_PAIRS, NO_QUESTIONS, NO_RESPONSES};
pub use clean::{extract_clean_text, is_citation_text, CleanOptions, CleanedFragment};
pub use decode::{decode_page, DecodeError, DecodedHtml};
pub use document::{build_notes_document, build_qa_text, collapse_to_single_line, NotesDocument};
pub use driver::{BulkDriver, BulkHandle, BulkQueue};
pub use filename::{chat_title, qa_filename, sanitize_filename};
pub use page::{ChatPage, ScriptEvaluator, ScriptedPage, SnapshotPage};
pub use pairs::{
    assistant_reply_count, build_conversation_pairs, latest_reply, message_content,
    response_elements, QaPair,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use relay::{
    make_data_url, parse_data_url, DirectoryDownloads, DownloadFacility, DownloadFailure,
    DownloadRequest, SaveFileRelay,
};
pub use scratch::{
    MemoryScratchStore, ScratchStore, NOTES_HTML_KEY, NOTES_MD_KEY, NOTES_QNA_KEY, NOTES_TEXT_KEY,
};
pub use selectors::{
    find_composer, find_send_button, ElementTarget, SelectorChain, COMPOSER_SELECTORS,
    MESSAGE_CONTENT_SELECTORS, SEND_BUTTON_SELECTORS,
};
pub use types::{ChannelMessageSink, DriverError, DriverSettings, MessageSink, PageError};
