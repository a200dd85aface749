//! Offline Worker Core
//!
//! The interception layer of the delivery pipeline: versioned cache store,
//! per-request fetch strategies, and the install/activate lifecycle. Runtime
//! events are dispatched explicitly through [`OfflineWorker::handle_event`];
//! a platform adapter outside this crate wires real worker events to it.

pub mod cache;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod strategy;
pub mod types;

pub use cache::{CacheGeneration, CacheStore, MemoryCacheStore};
pub use error::WorkerError;
pub use lifecycle::{LifecycleManager, WorkerPhase};
pub use network::{NetworkFetcher, ScriptedNetwork};
pub use strategy::{FetchInterceptor, RequestClass};
pub use types::*;

use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};

use crate::config::AppConfig;
use crate::notify::{
    ClientWindows, NotificationPresenter, NotificationRenderer, NotificationRouter,
    RenderedNotification, RouteAction,
};
use error::Result;

/// Run a fallible operation and turn any failure into a logged no-op.
///
/// Used only where failure is deliberately tolerated: pre-cache population
/// and opportunistic cache writes.
pub async fn best_effort<T>(label: &str, operation: impl Future<Output = Result<T>>) -> Option<T> {
    match operation.await {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("{label} failed (ignored): {err}");
            None
        }
    }
}

/// A runtime event delivered to the worker
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchRequest),
    /// Raw push message bytes
    Push(Vec<u8>),
    /// User interaction with a displayed notification
    NotificationClick {
        notification: RenderedNotification,
        action: Option<String>,
    },
}

/// What handling an event produced
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Installed,
    Activated,
    Fetched(Intercepted),
    /// Push handled; `None` means the display failed and was logged
    Notified(Option<RenderedNotification>),
    Routed(RouteAction),
}

/// The composed worker service: lifecycle, interceptor, renderer, and router
/// behind one explicit event dispatch table.
pub struct OfflineWorker {
    lifecycle: LifecycleManager,
    interceptor: FetchInterceptor,
    renderer: NotificationRenderer,
    router: NotificationRouter,
}

impl OfflineWorker {
    pub fn new(
        config: &AppConfig,
        cache: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkFetcher>,
        presenter: Arc<dyn NotificationPresenter>,
        windows: Arc<dyn ClientWindows>,
    ) -> Result<Self> {
        let lifecycle =
            LifecycleManager::new(config.worker.clone(), cache.clone(), network.clone())?;
        let interceptor = FetchInterceptor::new(config.worker.clone(), cache, network)?;
        let renderer = NotificationRenderer::new(config.notify.clone(), presenter.clone());
        let router = NotificationRouter::new(
            &config.worker.origin,
            config.notify.clone(),
            presenter,
            windows,
        );

        Ok(Self {
            lifecycle,
            interceptor,
            renderer,
            router,
        })
    }

    /// Dispatch one runtime event to its handler. Each event is an
    /// independent unit of work; push display is awaited before the event
    /// counts as handled.
    pub async fn handle_event(&self, event: WorkerEvent) -> Result<EventOutcome> {
        match event {
            WorkerEvent::Install => {
                self.lifecycle.install().await?;
                Ok(EventOutcome::Installed)
            }
            WorkerEvent::Activate => {
                self.lifecycle.activate().await?;
                Ok(EventOutcome::Activated)
            }
            WorkerEvent::Fetch(request) => {
                let intercepted = self.interceptor.handle(&request).await?;
                Ok(EventOutcome::Fetched(intercepted))
            }
            WorkerEvent::Push(raw) => match self.renderer.render(&raw).await {
                Ok(rendered) => Ok(EventOutcome::Notified(Some(rendered))),
                Err(err) => {
                    warn!("push notification display failed: {err}");
                    Ok(EventOutcome::Notified(None))
                }
            },
            WorkerEvent::NotificationClick {
                notification,
                action,
            } => {
                let route = self
                    .router
                    .handle_click(&notification, action.as_deref())
                    .await?;
                Ok(EventOutcome::Routed(route))
            }
        }
    }

    pub async fn phase(&self) -> WorkerPhase {
        self.lifecycle.phase().await
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn interceptor(&self) -> &FetchInterceptor {
        &self.interceptor
    }
}
