// Push Subscription Manager
//
// Establishes, persists, and tears down a device's push channel. All
// failures are caught at the operation boundary and reported as boolean
// outcomes; nothing here surfaces an exception to the page.

use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::config::PushConfig;
use crate::push::channel::PushChannel;
use crate::push::error::{PushError, Result};
use crate::push::store::{PreferencesStore, SubscriptionStore};
use crate::push::types::{
    NotificationPreferences, PermissionState, PushSubscriptionRecord,
};

/// Manages the device's subscription to the push message channel and its
/// persisted server-side record.
pub struct PushSubscriptionManager {
    channel: Arc<dyn PushChannel>,
    subscriptions: Arc<dyn SubscriptionStore>,
    preferences: Arc<dyn PreferencesStore>,
    application_server_key: String,
    user_agent: Option<String>,
}

impl PushSubscriptionManager {
    pub fn new(
        config: &PushConfig,
        channel: Arc<dyn PushChannel>,
        subscriptions: Arc<dyn SubscriptionStore>,
        preferences: Arc<dyn PreferencesStore>,
    ) -> Self {
        Self {
            channel,
            subscriptions,
            preferences,
            application_server_key: config.application_server_key.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Whether the environment supports interception, push messaging, and
    /// notifications. All three are required jointly.
    pub fn is_supported(&self) -> bool {
        self.channel.capabilities().push_usable()
    }

    /// Current permission without prompting
    pub async fn permission(&self) -> PermissionState {
        self.channel.permission().await
    }

    /// Prompt for permission unless the decision is already terminal.
    /// Denied is never re-prompted.
    pub async fn request_permission(&self) -> PermissionState {
        match self.channel.permission().await {
            PermissionState::Prompt => self.channel.request_permission().await,
            decided => decided,
        }
    }

    /// Opt the device in: ensure permission, reuse or create the channel
    /// subscription, and upsert the server-side record and preferences.
    /// Returns false on any failure; partial state is left for
    /// [`reconcile`](Self::reconcile) to repair.
    pub async fn subscribe(&self, profile_id: &str) -> bool {
        match self.try_subscribe(profile_id).await {
            Ok(endpoint) => {
                info!("push subscription active for {profile_id} at {endpoint}");
                true
            }
            Err(err) => {
                warn!("push subscribe failed for {profile_id}: {err}");
                false
            }
        }
    }

    async fn try_subscribe(&self, profile_id: &str) -> Result<String> {
        if !self.is_supported() {
            return Err(PushError::Unsupported);
        }

        match self.request_permission().await {
            PermissionState::Granted => {}
            PermissionState::Denied => return Err(PushError::PermissionDenied),
            PermissionState::Prompt => return Err(PushError::PermissionNotGranted),
        }

        self.channel.ensure_ready().await?;

        // Reuse the existing channel subscription; never create a duplicate
        // for the same device
        let subscription = match self.channel.subscription().await? {
            Some(existing) => existing,
            None => self.channel.subscribe(&self.application_server_key).await?,
        };

        let record = PushSubscriptionRecord {
            profile_id: profile_id.to_string(),
            endpoint: subscription.endpoint.clone(),
            p256dh_key: subscription.keys.p256dh.clone(),
            auth_key: subscription.keys.auth.clone(),
            user_agent: self.user_agent.clone(),
            updated_at: Utc::now(),
        };
        self.subscriptions.upsert(record).await?;

        let mut prefs = self
            .preferences
            .get(profile_id)
            .await?
            .unwrap_or_else(|| NotificationPreferences::for_profile(profile_id));
        prefs.push_enabled = true;
        self.preferences.upsert(prefs).await?;

        Ok(subscription.endpoint)
    }

    /// Opt the device out: cancel the channel subscription, delete the
    /// matching record, and flip the preference flag off. A device with no
    /// subscription is a no-op success.
    pub async fn unsubscribe(&self, profile_id: &str) -> bool {
        match self.try_unsubscribe(profile_id).await {
            Ok(()) => true,
            Err(err) => {
                warn!("push unsubscribe failed for {profile_id}: {err}");
                false
            }
        }
    }

    async fn try_unsubscribe(&self, profile_id: &str) -> Result<()> {
        let Some(subscription) = self.channel.subscription().await? else {
            debug!("unsubscribe with no active channel subscription; nothing to do");
            return Ok(());
        };

        let endpoint = subscription.endpoint;
        self.channel.unsubscribe().await?;
        self.subscriptions.delete(profile_id, &endpoint).await?;

        if let Some(mut prefs) = self.preferences.get(profile_id).await? {
            prefs.push_enabled = false;
            self.preferences.upsert(prefs).await?;
        }

        Ok(())
    }

    /// Whether an active channel subscription exists on this device,
    /// independent of server-side record state.
    pub async fn is_subscribed(&self) -> bool {
        matches!(self.channel.subscription().await, Ok(Some(_)))
    }

    /// Repair drift between the device's channel subscription and the
    /// server-side record: a live channel subscription with no row is
    /// re-persisted, and a row surviving a lost channel subscription is
    /// deleted with the preference flag flipped off.
    pub async fn reconcile(&self, profile_id: &str) -> Result<()> {
        let channel_subscription = self.channel.subscription().await?;
        let records = self.subscriptions.list_for_profile(profile_id).await?;

        match channel_subscription {
            Some(subscription) => {
                let persisted = records
                    .iter()
                    .any(|record| record.endpoint == subscription.endpoint);
                if !persisted {
                    info!("reconcile: re-persisting subscription record for {profile_id}");
                    self.subscriptions
                        .upsert(PushSubscriptionRecord {
                            profile_id: profile_id.to_string(),
                            endpoint: subscription.endpoint.clone(),
                            p256dh_key: subscription.keys.p256dh.clone(),
                            auth_key: subscription.keys.auth.clone(),
                            user_agent: self.user_agent.clone(),
                            updated_at: Utc::now(),
                        })
                        .await?;
                }
            }
            None => {
                // Channel subscription is gone; stale rows for this device
                // cannot be told apart from other devices' rows by endpoint
                // alone, so only the preference flag is repaired when no
                // rows remain.
                if records.is_empty() {
                    if let Some(mut prefs) = self.preferences.get(profile_id).await? {
                        if prefs.push_enabled {
                            info!("reconcile: disabling push preference for {profile_id}");
                            prefs.push_enabled = false;
                            self.preferences.upsert(prefs).await?;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
