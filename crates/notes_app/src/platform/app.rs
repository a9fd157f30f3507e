use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use notes_core::{update, Msg, PopupState, RuntimeMessage, StatusLine, TabInfo};
use notes_engine::{ensure_output_dir, AgentConfig, ChannelMessageSink, SnapshotPage};
use notes_logging::{notes_error, notes_info};
use tokio::sync::mpsc;

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::scratch::RonScratchStore;
use super::tabs::LocalTabs;

/// Which popup button the run presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportAction {
    CollectNotes,
    GenerateQa,
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub action: ExportAction,
    pub page: PathBuf,
    pub tab_url: String,
    pub reveal: bool,
}

struct App {
    state: PopupState,
    runner: EffectRunner,
    bus: mpsc::UnboundedReceiver<RuntimeMessage>,
}

impl App {
    /// Feed `msg` and every follow-up through the popup state machine.
    async fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            if self.state.consume_dirty() {
                self.render();
            }
            queue.extend(self.runner.run(effects).await);
        }
    }

    /// Relay everything currently on the runtime bus.
    async fn drain_bus(&mut self) {
        while let Ok(message) = self.bus.try_recv() {
            let outcome = self.runner.relay().handle(&message).await;
            self.dispatch(Msg::Runtime(message)).await;
            if let Some(outcome) = outcome {
                self.dispatch(Msg::Runtime(outcome)).await;
            }
        }
    }

    fn render(&self) {
        let view = self.state.view();
        if !view.status.is_empty() {
            println!("{}", view.status);
        }
    }
}

/// Run one popup action against a saved chat page.
pub async fn run(request: ExportRequest, config: AppConfig) -> anyhow::Result<()> {
    let bytes = fs::read(&request.page)
        .with_context(|| format!("failed to read saved page {:?}", request.page))?;
    let page = SnapshotPage::from_bytes(&bytes)
        .with_context(|| format!("failed to decode saved page {:?}", request.page))?;
    ensure_output_dir(&config.download_dir)
        .with_context(|| format!("download directory {:?} is unusable", config.download_dir))?;

    let (bus_tx, bus) = mpsc::unbounded_channel();
    let tab = TabInfo::new(1, request.tab_url.clone());
    let agent_config = AgentConfig {
        driver: config.driver.clone(),
        ..AgentConfig::default()
    };
    let tabs = LocalTabs::new(
        tab,
        Arc::new(page),
        agent_config,
        Arc::new(ChannelMessageSink::new(bus_tx)),
        Arc::new(RonScratchStore::open(&config.download_dir)),
    );
    let runner = EffectRunner::new(tabs, config.download_dir.clone());
    let mut app = App {
        state: PopupState::new(),
        runner,
        bus,
    };

    let active = Some(app.runner.tabs().active_tab());
    let first = match request.action {
        ExportAction::CollectNotes => Msg::CollectNotesClicked(active),
        ExportAction::GenerateQa => Msg::GenerateQaClicked(active),
    };
    notes_info!("Running {:?} on {:?}", request.action, request.page);
    app.dispatch(first).await;
    app.drain_bus().await;

    if !matches!(app.state.status(), StatusLine::Saved { .. }) {
        let status = app.state.view().status;
        notes_error!("{:?} did not produce a file: {}", request.action, status);
        bail!("{status}");
    }
    if request.reveal {
        app.dispatch(Msg::DownloadLinkClicked).await;
    }
    Ok(())
}
