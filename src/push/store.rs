// Subscription Persistence Seams
//
// Remote-store contracts for subscription rows and notification
// preferences. Subscription rows are upserted by (profile_id, endpoint) so
// concurrent subscribes from different devices never clobber each other.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::push::error::Result;
use crate::push::types::{
    Endpoint, NotificationPreferences, ProfileId, PushSubscriptionRecord,
};

/// Remote store of per-device subscription rows
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or update the row keyed by (profile_id, endpoint)
    async fn upsert(&self, record: PushSubscriptionRecord) -> Result<()>;

    /// Delete the row keyed by (profile_id, endpoint); returns whether it existed
    async fn delete(&self, profile_id: &str, endpoint: &str) -> Result<bool>;

    /// All subscription rows for a profile (one per device)
    async fn list_for_profile(&self, profile_id: &str) -> Result<Vec<PushSubscriptionRecord>>;
}

/// Remote store of per-profile notification preferences
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn get(&self, profile_id: &str) -> Result<Option<NotificationPreferences>>;

    /// Insert or update the record keyed by profile_id
    async fn upsert(&self, preferences: NotificationPreferences) -> Result<()>;
}

/// In-memory subscription store for tests and the demo binary
pub struct MemorySubscriptionStore {
    rows: Arc<RwLock<HashMap<(ProfileId, Endpoint), PushSubscriptionRecord>>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

impl Default for MemorySubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn upsert(&self, record: PushSubscriptionRecord) -> Result<()> {
        let key = (record.profile_id.clone(), record.endpoint.clone());
        self.rows.write().await.insert(key, record);
        Ok(())
    }

    async fn delete(&self, profile_id: &str, endpoint: &str) -> Result<bool> {
        let key = (profile_id.to_string(), endpoint.to_string());
        Ok(self.rows.write().await.remove(&key).is_some())
    }

    async fn list_for_profile(&self, profile_id: &str) -> Result<Vec<PushSubscriptionRecord>> {
        let rows = self.rows.read().await;
        let mut records: Vec<PushSubscriptionRecord> = rows
            .values()
            .filter(|record| record.profile_id == profile_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        Ok(records)
    }
}

/// In-memory preferences store
pub struct MemoryPreferencesStore {
    records: Arc<RwLock<HashMap<ProfileId, NotificationPreferences>>>,
}

impl MemoryPreferencesStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryPreferencesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferencesStore for MemoryPreferencesStore {
    async fn get(&self, profile_id: &str) -> Result<Option<NotificationPreferences>> {
        Ok(self.records.read().await.get(profile_id).cloned())
    }

    async fn upsert(&self, preferences: NotificationPreferences) -> Result<()> {
        self.records
            .write()
            .await
            .insert(preferences.profile_id.clone(), preferences);
        Ok(())
    }
}
