//! Push Subscription Lifecycle
//!
//! Client-side management of a device's push channel: capability detection,
//! permission, channel subscription, and the server-side record persisted
//! against the remote store. The channel and both stores are injected
//! interfaces; the simulated channel and in-memory stores back tests and the
//! demo binary.

pub mod channel;
pub mod error;
pub mod manager;
pub mod store;
pub mod types;

pub use channel::{ChannelSubscription, PushChannel, SimulatedPushChannel};
pub use error::PushError;
pub use manager::PushSubscriptionManager;
pub use store::{
    MemoryPreferencesStore, MemorySubscriptionStore, PreferencesStore, SubscriptionStore,
};
pub use types::{
    Endpoint, NotificationPreferences, PermissionState, ProfileId, PushCapabilities,
    PushSubscriptionRecord, SubscriptionKeys,
};
