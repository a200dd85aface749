// Push Channel Seam
//
// Abstracts the browser-side push machinery: capability detection,
// permission state, worker readiness, and channel subscription. The
// simulated channel stands in for a real platform bridge in tests and the
// demo binary.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::push::error::{PushError, Result};
use crate::push::types::{PermissionState, PushCapabilities, SubscriptionKeys};

/// A live channel subscription: the device's delivery address and keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Device-side push channel operations
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Capability flags of the hosting environment
    fn capabilities(&self) -> PushCapabilities;

    /// Current notification permission without prompting
    async fn permission(&self) -> PermissionState;

    /// Prompt for permission. Browsers never re-prompt once denied; callers
    /// must treat `Denied` as terminal and not call this again.
    async fn request_permission(&self) -> PermissionState;

    /// Register the interception layer and wait until it is ready
    async fn ensure_ready(&self) -> Result<()>;

    /// The existing channel subscription for this device, if any
    async fn subscription(&self) -> Result<Option<ChannelSubscription>>;

    /// Create a channel subscription with the application server key.
    /// Returns the existing subscription when one is already present.
    async fn subscribe(&self, application_server_key: &str) -> Result<ChannelSubscription>;

    /// Cancel the channel subscription. Returns whether one existed.
    async fn unsubscribe(&self) -> Result<bool>;
}

struct ChannelState {
    permission: PermissionState,
    grant_on_request: bool,
    subscription: Option<ChannelSubscription>,
    subscribe_calls: usize,
}

/// Simulated push channel: issues unique endpoints and keys, honors the
/// browser rule that a denied permission is never re-prompted.
pub struct SimulatedPushChannel {
    capabilities: PushCapabilities,
    state: Arc<RwLock<ChannelState>>,
}

impl SimulatedPushChannel {
    /// Fully capable channel that grants permission when prompted
    pub fn new() -> Self {
        Self::with_capabilities(PushCapabilities::full())
    }

    pub fn with_capabilities(capabilities: PushCapabilities) -> Self {
        Self {
            capabilities,
            state: Arc::new(RwLock::new(ChannelState {
                permission: PermissionState::Prompt,
                grant_on_request: true,
                subscription: None,
                subscribe_calls: 0,
            })),
        }
    }

    /// Channel whose user has already denied notifications
    pub fn denied() -> Self {
        Self {
            capabilities: PushCapabilities::full(),
            state: Arc::new(RwLock::new(ChannelState {
                permission: PermissionState::Denied,
                grant_on_request: false,
                subscription: None,
                subscribe_calls: 0,
            })),
        }
    }

    /// Make the next permission prompt deny instead of grant
    pub async fn deny_on_request(&self) {
        self.state.write().await.grant_on_request = false;
    }

    /// How many new channel subscriptions have been created
    pub async fn subscribe_calls(&self) -> usize {
        self.state.read().await.subscribe_calls
    }

    /// Drop the channel subscription without going through unsubscribe,
    /// simulating invalidation by the push service
    pub async fn invalidate_subscription(&self) {
        self.state.write().await.subscription = None;
    }
}

impl Default for SimulatedPushChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushChannel for SimulatedPushChannel {
    fn capabilities(&self) -> PushCapabilities {
        self.capabilities
    }

    async fn permission(&self) -> PermissionState {
        self.state.read().await.permission
    }

    async fn request_permission(&self) -> PermissionState {
        let mut state = self.state.write().await;
        match state.permission {
            PermissionState::Prompt => {
                state.permission = if state.grant_on_request {
                    PermissionState::Granted
                } else {
                    PermissionState::Denied
                };
                state.permission
            }
            decided => decided,
        }
    }

    async fn ensure_ready(&self) -> Result<()> {
        if !self.capabilities.service_worker {
            return Err(PushError::NotReady {
                reason: "no interception support".to_string(),
            });
        }
        Ok(())
    }

    async fn subscription(&self) -> Result<Option<ChannelSubscription>> {
        Ok(self.state.read().await.subscription.clone())
    }

    async fn subscribe(&self, application_server_key: &str) -> Result<ChannelSubscription> {
        if application_server_key.is_empty() {
            return Err(PushError::channel("missing application server key"));
        }

        let mut state = self.state.write().await;
        if let Some(existing) = &state.subscription {
            return Ok(existing.clone());
        }

        let device = Uuid::new_v4();
        let subscription = ChannelSubscription {
            endpoint: format!("https://push.simulated.dev/send/{}", device.simple()),
            keys: SubscriptionKeys {
                p256dh: format!("p256dh-{}", Uuid::new_v4().simple()),
                auth: format!("auth-{}", Uuid::new_v4().simple()),
            },
        };

        state.subscription = Some(subscription.clone());
        state.subscribe_calls += 1;
        Ok(subscription)
    }

    async fn unsubscribe(&self) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.subscription.take().is_some())
    }
}
