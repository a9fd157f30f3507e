use std::path::PathBuf;

use notes_core::{Effect, Msg, PageAction, PageRequest, TabId};
use notes_engine::{DirectoryDownloads, SaveFileRelay};
use notes_logging::{notes_debug, notes_info, notes_warn};

use super::tabs::LocalTabs;

/// Executes popup effects and turns their outcomes into follow-up messages.
pub struct EffectRunner {
    tabs: LocalTabs,
    relay: SaveFileRelay<DirectoryDownloads>,
    download_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(tabs: LocalTabs, download_dir: PathBuf) -> Self {
        let relay = SaveFileRelay::new(DirectoryDownloads::new(download_dir.clone()));
        Self {
            tabs,
            relay,
            download_dir,
        }
    }

    pub fn tabs(&self) -> &LocalTabs {
        &self.tabs
    }

    pub fn relay(&self) -> &SaveFileRelay<DirectoryDownloads> {
        &self.relay
    }

    pub async fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::SendToPage {
                    tab_id,
                    action,
                    request,
                } => {
                    follow_ups.push(self.deliver(tab_id, action, request, false).await);
                }
                Effect::InjectAndRetry {
                    tab_id,
                    action,
                    request,
                } => {
                    notes_info!("Page agent unreachable in tab {}, injecting", tab_id.0);
                    let msg = match self.tabs.inject(tab_id) {
                        Ok(()) => self.deliver(tab_id, action, request, true).await,
                        Err(error) => Msg::PageUnreachable {
                            tab_id,
                            action,
                            request,
                            error,
                            retried: true,
                        },
                    };
                    follow_ups.push(msg);
                }
                Effect::OpenDownload { download_id } => {
                    let target = download_id
                        .and_then(|id| self.relay.facility().path_for(id))
                        .unwrap_or_else(|| self.download_dir.clone());
                    notes_info!("Opening {:?}", target);
                    println!("{}", target.display());
                }
                Effect::FocusBulkInput | Effect::ClearBulkInput => {
                    notes_debug!("No bulk input to update for {:?}", effect);
                }
            }
        }
        follow_ups
    }

    async fn deliver(
        &self,
        tab_id: TabId,
        action: PageAction,
        request: PageRequest,
        retried: bool,
    ) -> Msg {
        match self.tabs.send(tab_id, request.clone()).await {
            Ok(response) => Msg::PageResponded { action, response },
            Err(error) => {
                notes_warn!("Sending {:?} to tab {} failed: {}", request, tab_id.0, error);
                Msg::PageUnreachable {
                    tab_id,
                    action,
                    request,
                    error,
                    retried,
                }
            }
        }
    }
}
