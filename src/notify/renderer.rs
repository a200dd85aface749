// Notification Renderer
//
// Turns an inbound push message into a visible system notification. Display
// is awaited: the push event is only considered handled once the presenter
// has finished showing the notification.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::NotifyConfig;
use crate::notify::error::Result;
use crate::notify::payload::{NotificationPayload, PayloadAction};

/// Display parameters for one notification. A new notification with the same
/// tag replaces a prior undismissed one; `renotify` forces a re-alert on
/// replacement instead of a silent merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    pub title: String,
    pub body: String,
    pub url: String,
    pub tag: String,
    pub renotify: bool,
    pub actions: Vec<PayloadAction>,
}

/// Displays and dismisses system notifications
#[async_trait]
pub trait NotificationPresenter: Send + Sync {
    /// Show a notification, replacing any visible one with the same tag
    async fn show(&self, notification: RenderedNotification) -> Result<()>;

    /// Dismiss the visible notification with the given tag, if any
    async fn close(&self, tag: &str) -> Result<()>;
}

/// In-memory presenter: keeps at most one visible notification per tag and
/// counts alerts, which makes tag replacement observable in tests.
pub struct MemoryPresenter {
    visible: Arc<RwLock<HashMap<String, RenderedNotification>>>,
    alerts: Arc<RwLock<usize>>,
}

impl MemoryPresenter {
    pub fn new() -> Self {
        Self {
            visible: Arc::new(RwLock::new(HashMap::new())),
            alerts: Arc::new(RwLock::new(0)),
        }
    }

    /// Number of currently visible notifications
    pub async fn visible_count(&self) -> usize {
        self.visible.read().await.len()
    }

    /// The visible notification for a tag, if any
    pub async fn visible(&self, tag: &str) -> Option<RenderedNotification> {
        self.visible.read().await.get(tag).cloned()
    }

    /// How many times the user has been alerted (including re-alerts)
    pub async fn alert_count(&self) -> usize {
        *self.alerts.read().await
    }
}

impl Default for MemoryPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationPresenter for MemoryPresenter {
    async fn show(&self, notification: RenderedNotification) -> Result<()> {
        let mut visible = self.visible.write().await;
        let replacing = visible.contains_key(&notification.tag);

        // Same tag replaces; renotify re-alerts even on replacement
        if !replacing || notification.renotify {
            *self.alerts.write().await += 1;
        }
        visible.insert(notification.tag.clone(), notification);
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<()> {
        self.visible.write().await.remove(tag);
        Ok(())
    }
}

/// Decodes push payloads and hands them to the presenter
pub struct NotificationRenderer {
    defaults: NotifyConfig,
    presenter: Arc<dyn NotificationPresenter>,
}

impl NotificationRenderer {
    pub fn new(defaults: NotifyConfig, presenter: Arc<dyn NotificationPresenter>) -> Self {
        Self {
            defaults,
            presenter,
        }
    }

    /// Decode the raw push bytes and display the resulting notification.
    /// Returns the displayed parameters once the presenter has finished.
    pub async fn render(&self, raw: &[u8]) -> Result<RenderedNotification> {
        let payload = NotificationPayload::decode(raw, &self.defaults);

        let rendered = RenderedNotification {
            title: payload.title,
            body: payload.body,
            url: payload.url,
            tag: payload
                .tag
                .unwrap_or_else(|| self.defaults.default_tag.clone()),
            renotify: true,
            actions: payload.actions,
        };

        self.presenter.show(rendered.clone()).await?;
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_renderer() -> (NotificationRenderer, Arc<MemoryPresenter>) {
        let presenter = Arc::new(MemoryPresenter::new());
        let renderer = NotificationRenderer::new(NotifyConfig::default(), presenter.clone());
        (renderer, presenter)
    }

    #[tokio::test]
    async fn test_render_displays_notification() {
        let (renderer, presenter) = make_renderer();
        let rendered = renderer
            .render(br#"{ "title": "T", "body": "B", "url": "/u", "tag": "t1" }"#)
            .await
            .unwrap();

        assert!(rendered.renotify);
        assert_eq!(presenter.visible_count().await, 1);
        assert_eq!(presenter.visible("t1").await.unwrap().body, "B");
    }

    #[tokio::test]
    async fn test_partial_payload_renders_with_defaults() {
        let (renderer, presenter) = make_renderer();
        let rendered = renderer.render(br#"{ "body": "X" }"#).await.unwrap();

        assert_eq!(rendered.title, "Cleave");
        assert_eq!(rendered.body, "X");
        assert_eq!(rendered.url, "/dashboard");
        assert_eq!(rendered.tag, "cleave-general");
        assert!(presenter.visible("cleave-general").await.is_some());
    }

    #[tokio::test]
    async fn test_same_tag_replaces_and_re_alerts() {
        let (renderer, presenter) = make_renderer();
        renderer
            .render(br#"{ "body": "first", "tag": "nudge" }"#)
            .await
            .unwrap();
        renderer
            .render(br#"{ "body": "second", "tag": "nudge" }"#)
            .await
            .unwrap();

        assert_eq!(presenter.visible_count().await, 1);
        assert_eq!(presenter.visible("nudge").await.unwrap().body, "second");
        assert_eq!(presenter.alert_count().await, 2);
    }

    #[tokio::test]
    async fn test_distinct_tags_stack() {
        let (renderer, presenter) = make_renderer();
        renderer.render(br#"{ "body": "a", "tag": "t1" }"#).await.unwrap();
        renderer.render(br#"{ "body": "b", "tag": "t2" }"#).await.unwrap();
        assert_eq!(presenter.visible_count().await, 2);
    }
}
