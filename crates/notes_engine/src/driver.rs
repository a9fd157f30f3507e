//! Sequential bulk question driver.
//!
//! One actor task per page owns the [`BulkQueue`]. Enqueue requests reach it
//! over a channel and are accepted at every point where a run waits on the
//! page or a timer, so a second batch joins the running queue instead of
//! starting another loop.
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use notes_core::{BulkStatus, RuntimeMessage};
use notes_logging::{notes_debug, notes_info, notes_warn};
use rand::Rng;
use scraper::Html;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::page::ChatPage;
use crate::pairs::{assistant_reply_count, latest_reply};
use crate::selectors::{find_composer, find_send_button, ElementTarget};
use crate::types::{DriverError, DriverSettings, MessageSink, PageError};

/// Pending questions plus the bookkeeping behind every progress event.
#[derive(Debug, Default)]
pub struct BulkQueue {
    pending: VecDeque<String>,
    running: bool,
    processed: usize,
    current: Option<String>,
}

impl BulkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the non-blank questions, trimmed. Returns how many were added.
    pub fn enqueue<I>(&mut self, questions: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.pending.len();
        self.pending.extend(
            questions
                .into_iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty()),
        );
        self.pending.len() - before
    }

    /// `queued` while idle, `queued_more` while a run is active.
    pub fn queued_status(&self, added: usize) -> BulkStatus {
        let (total, pending, processed) = (self.total(), self.pending(), self.processed);
        if self.running {
            BulkStatus::QueuedMore {
                total,
                pending,
                processed,
                added,
            }
        } else {
            BulkStatus::Queued {
                total,
                pending,
                processed,
                added,
            }
        }
    }

    pub fn start(&mut self) -> BulkStatus {
        self.running = true;
        BulkStatus::Started {
            total: self.total(),
            pending: self.pending(),
            processed: self.processed,
        }
    }

    /// Move the front question in flight.
    pub fn next_question(&mut self) -> Option<String> {
        let question = self.pending.pop_front()?;
        self.current = Some(question.clone());
        Some(question)
    }

    pub fn finish_current(&mut self) {
        if self.current.take().is_some() {
            self.processed += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Processed, in-flight and pending questions.
    pub fn total(&self) -> usize {
        self.processed + usize::from(self.current.is_some()) + self.pending.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

enum DriverCommand {
    Enqueue {
        questions: Vec<String>,
        reply: oneshot::Sender<usize>,
    },
}

/// Cloneable front door to a running [`BulkDriver`].
#[derive(Clone)]
pub struct BulkHandle {
    cmd_tx: mpsc::UnboundedSender<DriverCommand>,
}

impl BulkHandle {
    /// Queue questions; returns how many were accepted after trimming.
    pub async fn enqueue(&self, questions: Vec<String>) -> Result<usize, DriverError> {
        let (reply, accepted) = oneshot::channel();
        self.cmd_tx
            .send(DriverCommand::Enqueue { questions, reply })
            .map_err(|_| DriverError::Stopped)?;
        accepted.await.map_err(|_| DriverError::Stopped)
    }
}

pub struct BulkDriver {
    page: Arc<dyn ChatPage>,
    settings: DriverSettings,
    sink: Arc<dyn MessageSink>,
    queue: BulkQueue,
    commands: mpsc::UnboundedReceiver<DriverCommand>,
}

impl BulkDriver {
    /// Start the driver task on the current tokio runtime.
    pub fn spawn(
        page: Arc<dyn ChatPage>,
        settings: DriverSettings,
        sink: Arc<dyn MessageSink>,
    ) -> BulkHandle {
        let (cmd_tx, commands) = mpsc::unbounded_channel();
        let driver = Self {
            page,
            settings,
            sink,
            queue: BulkQueue::new(),
            commands,
        };
        tokio::spawn(driver.run());
        BulkHandle { cmd_tx }
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.accept(command);
            if self.queue.pending() > 0 {
                self.drain().await;
            }
        }
        notes_debug!("Bulk driver stopped: all handles dropped");
    }

    fn accept(&mut self, command: DriverCommand) {
        match command {
            DriverCommand::Enqueue { questions, reply } => {
                let added = self.queue.enqueue(questions);
                if added > 0 {
                    notes_info!("Queued {added} question(s), {} pending", self.queue.pending());
                    self.emit(self.queue.queued_status(added));
                }
                let _ = reply.send(added);
            }
        }
    }

    fn emit(&self, status: BulkStatus) {
        self.sink.post(RuntimeMessage::BulkStatus(status));
    }

    async fn drain(&mut self) {
        let started = self.queue.start();
        self.emit(started);

        while let Some(question) = self.queue.next_question() {
            let index = self.queue.processed() + 1;
            self.emit(BulkStatus::Asking {
                index,
                total: self.queue.total(),
                pending: self.queue.pending(),
                question: question.clone(),
            });

            if let Err(err) = self.ask(index, &question).await {
                notes_warn!("Bulk run aborted at question {index}: {err}");
                self.emit(BulkStatus::Error {
                    error: err.to_string(),
                });
                self.queue.reset();
                return;
            }

            self.queue.finish_current();
            self.emit(BulkStatus::Answered {
                index: self.queue.processed(),
                total: self.queue.total(),
                pending: self.queue.pending(),
            });

            if self.queue.pending() > 0 {
                let delay = pick_delay(&self.settings);
                notes_debug!("Pausing {} ms before the next question", delay.as_millis());
                self.countdown(delay).await;
            }
        }

        let processed = self.queue.processed();
        notes_info!("Bulk run complete: {processed} question(s) answered");
        self.emit(BulkStatus::Complete { processed });
        self.queue.reset();
    }

    async fn ask(&mut self, index: usize, question: &str) -> Result<(), DriverError> {
        let composer = self
            .wait_for_element(find_composer)
            .await?
            .ok_or(DriverError::ComposerNotFound)?;

        let previous = reply_count(&self.snapshot().await?);

        let page = Arc::clone(&self.page);
        self.with_intake(page.fill_input(&composer, question)).await?;

        let send = self
            .wait_for_element(find_send_button)
            .await?
            .ok_or(DriverError::SendButtonNotFound)?;
        self.with_intake(page.click(&send)).await?;

        self.wait_for_reply(index, previous).await
    }

    /// Poll the page until `find` locates an element or the lookup window
    /// closes.
    async fn wait_for_element(
        &mut self,
        find: fn(&Html) -> Option<ElementTarget>,
    ) -> Result<Option<ElementTarget>, PageError> {
        let deadline = Instant::now() + self.settings.element_timeout();
        loop {
            let html = self.snapshot().await?;
            if let Some(target) = locate(&html, find) {
                return Ok(Some(target));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let step = self.settings.poll_interval().min(deadline - now);
            self.with_intake(time::sleep(step)).await;
        }
    }

    async fn wait_for_reply(&mut self, index: usize, previous: usize) -> Result<(), DriverError> {
        let timeout = self.settings.reply_timeout();
        let timeout_ms = millis(timeout);
        let start = Instant::now();
        let mut mutations = self.page.subscribe_mutations();

        if self.reply_arrived(previous).await? {
            self.emit_waiting(index, 0, timeout_ms);
            return Ok(());
        }
        self.emit_waiting(index, millis(start.elapsed()), timeout_ms);

        let deadline = time::sleep_until(start + timeout);
        tokio::pin!(deadline);
        let period = self.settings.progress_interval();
        let mut ticker = time::interval_at(start + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut observing = true;

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    self.emit_waiting(index, millis(start.elapsed()), timeout_ms);
                    return Err(DriverError::ReplyTimeout);
                }
                _ = ticker.tick() => {
                    self.emit_waiting(index, millis(start.elapsed()), timeout_ms);
                }
                changed = mutations.recv(), if observing => {
                    if matches!(changed, Err(broadcast::error::RecvError::Closed)) {
                        observing = false;
                        continue;
                    }
                    if self.reply_arrived(previous).await? {
                        self.emit_waiting(index, millis(start.elapsed()), timeout_ms);
                        return Ok(());
                    }
                }
                Some(command) = self.commands.recv() => self.accept(command),
            }
        }
    }

    async fn countdown(&mut self, total: Duration) {
        let end = Instant::now() + total;
        loop {
            let remaining = end.saturating_duration_since(Instant::now());
            self.emit(BulkStatus::Delay {
                index: self.queue.processed(),
                total: self.queue.total(),
                pending: self.queue.pending(),
                remaining_ms: millis(remaining),
            });
            if remaining.is_zero() {
                return;
            }
            let step = self.settings.countdown_step().min(remaining);
            self.with_intake(time::sleep(step)).await;
        }
    }

    fn emit_waiting(&self, index: usize, elapsed_ms: u64, timeout_ms: u64) {
        self.emit(BulkStatus::WaitingReply {
            index,
            total: self.queue.total(),
            pending: self.queue.pending(),
            elapsed_ms,
            timeout_ms,
        });
    }

    async fn reply_arrived(&mut self, previous: usize) -> Result<bool, PageError> {
        let html = self.snapshot().await?;
        Ok(has_new_reply(&html, previous))
    }

    async fn snapshot(&mut self) -> Result<String, PageError> {
        let page = Arc::clone(&self.page);
        self.with_intake(page.document_html()).await
    }

    /// Drive `work` to completion while still accepting enqueue commands.
    async fn with_intake<F: Future>(&mut self, work: F) -> F::Output {
        tokio::pin!(work);
        loop {
            tokio::select! {
                output = &mut work => return output,
                Some(command) = self.commands.recv() => self.accept(command),
            }
        }
    }
}

fn locate(html: &str, find: fn(&Html) -> Option<ElementTarget>) -> Option<ElementTarget> {
    find(&Html::parse_document(html))
}

fn reply_count(html: &str) -> usize {
    assistant_reply_count(&Html::parse_document(html))
}

fn has_new_reply(html: &str, previous: usize) -> bool {
    latest_reply(&Html::parse_document(html), previous).is_some()
}

fn pick_delay(settings: &DriverSettings) -> Duration {
    let (low, high) = settings.delay_bounds_ms();
    Duration::from_millis(rand::thread_rng().gen_range(low..=high))
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use notes_core::BulkStatus;
    use pretty_assertions::assert_eq;

    use super::{pick_delay, BulkQueue};
    use crate::types::DriverSettings;

    #[test]
    fn enqueue_trims_and_drops_blank_questions() {
        let mut queue = BulkQueue::new();
        let added = queue.enqueue(vec!["  one ".into(), "   ".into(), "two".into()]);
        assert_eq!(added, 2);
        assert_eq!(queue.next_question().as_deref(), Some("one"));
    }

    #[test]
    fn totals_include_the_question_in_flight() {
        let mut queue = BulkQueue::new();
        queue.enqueue(vec!["a".into(), "b".into()]);
        queue.start();
        queue.next_question();
        queue.enqueue(vec!["c".into()]);
        assert_eq!(
            queue.queued_status(1),
            BulkStatus::QueuedMore {
                total: 3,
                pending: 2,
                processed: 0,
                added: 1,
            }
        );
        queue.finish_current();
        assert_eq!((queue.processed(), queue.total(), queue.current()), (1, 3, None));
    }

    #[test]
    fn idle_queue_reports_queued() {
        let mut queue = BulkQueue::new();
        queue.enqueue(vec!["a".into()]);
        assert!(matches!(queue.queued_status(1), BulkStatus::Queued { total: 1, .. }));
        assert!(!queue.is_running());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut queue = BulkQueue::new();
        queue.enqueue(vec!["a".into(), "b".into()]);
        queue.start();
        queue.next_question();
        queue.finish_current();
        queue.reset();
        assert_eq!((queue.total(), queue.pending(), queue.is_running()), (0, 0, false));
    }

    #[test]
    fn delay_stays_within_bounds() {
        let settings = DriverSettings {
            min_delay_ms: 30,
            max_delay_ms: 10,
            ..DriverSettings::default()
        };
        for _ in 0..50 {
            let ms = pick_delay(&settings).as_millis();
            assert!((10..=30).contains(&ms));
        }
    }
}
