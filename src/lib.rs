pub mod config;
pub mod dispatch;
pub mod notify;
pub mod push;
pub mod worker;

pub use config::{AppConfig, NotifyConfig, PushConfig, WorkerConfig};
pub use dispatch::{DeliveryReport, Dispatcher, PushSender};
pub use notify::{
    MemoryPresenter, MemoryWindows, NotificationPayload, NotificationRenderer,
    NotificationRouter, RenderedNotification, RouteAction,
};
pub use push::{
    MemoryPreferencesStore, MemorySubscriptionStore, PushSubscriptionManager,
    SimulatedPushChannel,
};
pub use worker::{
    EventOutcome, FetchRequest, Intercepted, MemoryCacheStore, OfflineWorker, ResponseSource,
    ScriptedNetwork, WorkerEvent, WorkerPhase,
};

/// Common result type for Threefold operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
