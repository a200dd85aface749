// Push Subscription Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user profile in the remote store
pub type ProfileId = String;

/// Opaque push endpoint URL issued by the browser's push service
pub type Endpoint = String;

/// Credential keys issued alongside a channel subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// P-256 Diffie-Hellman public key
    pub p256dh: String,
    /// Authentication secret
    pub auth: String,
}

/// One device's persisted push subscription. Uniqueness is enforced by the
/// composite key (profile_id, endpoint): one row per device, any number of
/// devices per profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscriptionRecord {
    pub profile_id: ProfileId,
    pub endpoint: Endpoint,
    pub p256dh_key: String,
    pub auth_key: String,
    pub user_agent: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Per-profile notification preferences. Created lazily on first opt-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub profile_id: ProfileId,
    /// Global push toggle
    pub push_enabled: bool,
    pub devotional_reminders: bool,
    pub assessment_updates: bool,
    pub spouse_activity: bool,
    /// Preferred daily reminder time, "HH:MM"
    pub reminder_time: String,
}

impl NotificationPreferences {
    /// Default preference set for a profile, with push enabled
    pub fn for_profile(profile_id: impl Into<ProfileId>) -> Self {
        Self {
            profile_id: profile_id.into(),
            push_enabled: true,
            devotional_reminders: true,
            assessment_updates: true,
            spouse_activity: true,
            reminder_time: "08:00".to_string(),
        }
    }
}

/// Three-valued notification permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    /// Terminal for the session; never re-prompted
    Denied,
    /// Not yet decided
    Prompt,
}

/// The three capabilities jointly required for push to be usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushCapabilities {
    pub service_worker: bool,
    pub push_manager: bool,
    pub notifications: bool,
}

impl PushCapabilities {
    /// Fully capable environment
    pub fn full() -> Self {
        Self {
            service_worker: true,
            push_manager: true,
            notifications: true,
        }
    }

    pub fn push_usable(&self) -> bool {
        self.service_worker && self.push_manager && self.notifications
    }
}
