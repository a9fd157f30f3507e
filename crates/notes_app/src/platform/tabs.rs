//! In-process stand-in for the browser's tab messaging.
use std::sync::{Arc, OnceLock};

use notes_core::{PageRequest, PageResponse, TabId, TabInfo};
use notes_engine::{AgentConfig, ChatPage, MessageSink, PageAgent, ScratchStore};
use notes_logging::{notes_debug, notes_info};

/// What the messaging layer reports when no agent listens in a tab.
pub const NO_RECEIVER: &str = "Could not establish connection. Receiving end does not exist.";

/// A single tab hosting one page. The page agent is absent until injected
/// and is attached at most once.
pub struct LocalTabs {
    tab: TabInfo,
    page: Arc<dyn ChatPage>,
    agent_config: AgentConfig,
    outbox: Arc<dyn MessageSink>,
    scratch: Arc<dyn ScratchStore>,
    agent: OnceLock<PageAgent>,
}

impl LocalTabs {
    pub fn new(
        tab: TabInfo,
        page: Arc<dyn ChatPage>,
        agent_config: AgentConfig,
        outbox: Arc<dyn MessageSink>,
        scratch: Arc<dyn ScratchStore>,
    ) -> Self {
        Self {
            tab,
            page,
            agent_config,
            outbox,
            scratch,
            agent: OnceLock::new(),
        }
    }

    pub fn active_tab(&self) -> TabInfo {
        self.tab.clone()
    }

    /// Deliver `request` to the agent in `tab_id`.
    pub async fn send(&self, tab_id: TabId, request: PageRequest) -> Result<PageResponse, String> {
        match self.agent_in(tab_id) {
            Some(agent) => Ok(agent.handle(request).await),
            None => Err(NO_RECEIVER.to_string()),
        }
    }

    /// Attach the page agent to `tab_id`. Repeated injection is a no-op.
    pub fn inject(&self, tab_id: TabId) -> Result<(), String> {
        if tab_id != self.tab.id {
            return Err(format!("No tab with id {}.", tab_id.0));
        }
        if self.agent.get().is_some() {
            notes_debug!("Page agent already attached to tab {}", tab_id.0);
            return Ok(());
        }
        self.agent.get_or_init(|| {
            notes_info!("Attaching page agent to tab {} ({})", tab_id.0, self.tab.url);
            PageAgent::attach(
                Arc::clone(&self.page),
                self.agent_config.clone(),
                Arc::clone(&self.outbox),
                Arc::clone(&self.scratch),
            )
        });
        Ok(())
    }

    fn agent_in(&self, tab_id: TabId) -> Option<&PageAgent> {
        if tab_id == self.tab.id {
            self.agent.get()
        } else {
            None
        }
    }
}
