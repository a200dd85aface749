//! Notification Rendering and Routing
//!
//! Decodes inbound push payloads into system notifications and routes user
//! interaction with them back into the application. The presenter and window
//! set are injected interfaces so the pipeline runs the same against the
//! in-memory implementations and a real platform adapter.

pub mod error;
pub mod payload;
pub mod renderer;
pub mod router;

pub use error::NotifyError;
pub use payload::{NotificationPayload, PayloadAction};
pub use renderer::{
    MemoryPresenter, NotificationPresenter, NotificationRenderer, RenderedNotification,
};
pub use router::{
    ClientTab, ClientWindows, MemoryWindows, NotificationRouter, RouteAction, ACTION_DISMISS,
    ACTION_READ,
};
