use std::time::Duration;

use notes_core::RuntimeMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Timing knobs for the bulk question driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub poll_interval_ms: u64,
    pub element_timeout_ms: u64,
    pub reply_timeout_ms: u64,
    pub progress_interval_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub countdown_step_ms: u64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            element_timeout_ms: 5_000,
            reply_timeout_ms: 300_000,
            progress_interval_ms: 1_000,
            min_delay_ms: 5_000,
            max_delay_ms: 20_000,
            countdown_step_ms: 1_000,
        }
    }
}

impl DriverSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }

    pub fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms.max(1))
    }

    /// Delay bounds with `min <= max` enforced.
    pub fn delay_bounds_ms(&self) -> (u64, u64) {
        let low = self.min_delay_ms.min(self.max_delay_ms);
        let high = self.min_delay_ms.max(self.max_delay_ms);
        (low, high)
    }
}

/// Failures reported by a page implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page is read-only")]
    ReadOnly,
    #[error("page is no longer available")]
    Detached,
    #[error("script failed: {0}")]
    Script(String),
}

/// Failures of a single bulk question; the display text is what the popup shows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("Could not find ChatGPT input box.")]
    ComposerNotFound,
    #[error("Could not find ChatGPT send button.")]
    SendButtonNotFound,
    #[error("Timed out waiting for ChatGPT reply.")]
    ReplyTimeout,
    #[error("Bulk processing failed.")]
    Stopped,
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Destination for messages posted to the extension runtime bus.
pub trait MessageSink: Send + Sync {
    fn post(&self, message: RuntimeMessage);
}

pub struct ChannelMessageSink {
    tx: mpsc::UnboundedSender<RuntimeMessage>,
}

impl ChannelMessageSink {
    pub fn new(tx: mpsc::UnboundedSender<RuntimeMessage>) -> Self {
        Self { tx }
    }
}

impl MessageSink for ChannelMessageSink {
    fn post(&self, message: RuntimeMessage) {
        let _ = self.tx.send(message);
    }
}
