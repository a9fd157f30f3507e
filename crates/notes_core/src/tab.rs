use url::Url;

/// Hosts the page agent knows how to read.
pub const ALLOWED_HOSTS: &[&str] = &["chat.openai.com", "chatgpt.com", "www.chatgpt.com"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
}

impl TabInfo {
    pub fn new(id: u32, url: impl Into<String>) -> Self {
        Self {
            id: TabId(id),
            url: url.into(),
        }
    }
}

pub fn is_supported_tab(tab: &TabInfo) -> bool {
    Url::parse(&tab.url)
        .ok()
        .and_then(|url| url.host_str().map(|host| ALLOWED_HOSTS.contains(&host)))
        .unwrap_or(false)
}
