// Notification Click Routing
//
// Decides which view to focus or open when the user interacts with a
// displayed notification. The notification is always closed first, whatever
// the action. Bare clicks reuse an existing application tab when one is open
// instead of opening a duplicate.

use async_trait::async_trait;
use log::warn;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::NotifyConfig;
use crate::notify::error::{NotifyError, Result};
use crate::notify::renderer::{NotificationPresenter, RenderedNotification};

/// Structured action identifier for the devotional read button
pub const ACTION_READ: &str = "read";
/// Structured action identifier for the dismiss button
pub const ACTION_DISMISS: &str = "dismiss";

/// One open application tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTab {
    pub id: u64,
    pub url: String,
}

/// The set of open application windows/tabs
#[async_trait]
pub trait ClientWindows: Send + Sync {
    async fn open_tabs(&self) -> Result<Vec<ClientTab>>;
    async fn navigate(&self, tab: u64, url: &str) -> Result<()>;
    async fn focus(&self, tab: u64) -> Result<()>;
    /// Open a new tab at the URL and return its identifier
    async fn open_window(&self, url: &str) -> Result<u64>;
}

/// What routing a click resulted in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Dismiss action: nothing opened or focused
    Dismissed,
    /// An existing tab was navigated to the target and focused
    FocusedExisting { tab: u64, url: String },
    /// No application tab was open; a new one was opened
    OpenedWindow { tab: u64, url: String },
}

/// Routes notification interaction back into the application
pub struct NotificationRouter {
    origin: String,
    defaults: NotifyConfig,
    presenter: Arc<dyn NotificationPresenter>,
    windows: Arc<dyn ClientWindows>,
}

impl NotificationRouter {
    pub fn new(
        origin: &str,
        defaults: NotifyConfig,
        presenter: Arc<dyn NotificationPresenter>,
        windows: Arc<dyn ClientWindows>,
    ) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            defaults,
            presenter,
            windows,
        }
    }

    /// Handle a click on a displayed notification. The notification closes
    /// first in every case; the clicked action then decides the target.
    pub async fn handle_click(
        &self,
        notification: &RenderedNotification,
        action: Option<&str>,
    ) -> Result<RouteAction> {
        if let Err(err) = self.presenter.close(&notification.tag).await {
            warn!("failed to close notification {}: {err}", notification.tag);
        }

        match action {
            Some(ACTION_DISMISS) => Ok(RouteAction::Dismissed),
            Some(ACTION_READ) => {
                let url = self.defaults.devotional_url.clone();
                self.focus_or_open(&url).await
            }
            // Bare click or an action we don't recognize: resolve the
            // target from the notification itself
            _ => {
                let url = if notification.url.is_empty() {
                    self.defaults.default_url.clone()
                } else {
                    notification.url.clone()
                };
                self.focus_or_open(&url).await
            }
        }
    }

    /// Navigate and focus an existing application tab, or open a new one
    /// when none belongs to this origin
    async fn focus_or_open(&self, url: &str) -> Result<RouteAction> {
        let target = self.absolute(url);
        let tabs = self.windows.open_tabs().await?;

        if let Some(tab) = tabs.iter().find(|tab| tab.url.starts_with(&self.origin)) {
            self.windows.navigate(tab.id, &target).await?;
            self.windows.focus(tab.id).await?;
            return Ok(RouteAction::FocusedExisting {
                tab: tab.id,
                url: target,
            });
        }

        let opened = self.windows.open_window(&target).await?;
        Ok(RouteAction::OpenedWindow {
            tab: opened,
            url: target,
        })
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.origin, url)
        } else {
            url.to_string()
        }
    }
}

/// In-memory window set for tests and the demo binary
pub struct MemoryWindows {
    tabs: Arc<RwLock<Vec<ClientTab>>>,
    focused: Arc<RwLock<Option<u64>>>,
    next_id: AtomicU64,
}

impl MemoryWindows {
    pub fn new() -> Self {
        Self {
            tabs: Arc::new(RwLock::new(Vec::new())),
            focused: Arc::new(RwLock::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Add an already-open tab (test setup), returning its id
    pub async fn add_tab(&self, url: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.tabs.write().await.push(ClientTab {
            id,
            url: url.into(),
        });
        id
    }

    pub async fn tab_count(&self) -> usize {
        self.tabs.read().await.len()
    }

    pub async fn tab_url(&self, id: u64) -> Option<String> {
        self.tabs
            .read()
            .await
            .iter()
            .find(|tab| tab.id == id)
            .map(|tab| tab.url.clone())
    }

    pub async fn focused(&self) -> Option<u64> {
        *self.focused.read().await
    }
}

impl Default for MemoryWindows {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientWindows for MemoryWindows {
    async fn open_tabs(&self) -> Result<Vec<ClientTab>> {
        Ok(self.tabs.read().await.clone())
    }

    async fn navigate(&self, tab: u64, url: &str) -> Result<()> {
        let mut tabs = self.tabs.write().await;
        let entry = tabs
            .iter_mut()
            .find(|t| t.id == tab)
            .ok_or_else(|| NotifyError::windows(format!("no tab {tab}")))?;
        entry.url = url.to_string();
        Ok(())
    }

    async fn focus(&self, tab: u64) -> Result<()> {
        *self.focused.write().await = Some(tab);
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<u64> {
        let id = self.add_tab(url).await;
        *self.focused.write().await = Some(id);
        Ok(id)
    }
}
