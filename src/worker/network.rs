// Network Seam
//
// The interceptor and lifecycle manager never open sockets themselves; all
// live traffic goes through this interface so the runtime adapter can bridge
// to a real fetch and tests can script responses and outages.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::worker::error::{Result, WorkerError};
use crate::worker::types::{CapturedResponse, FetchRequest};

/// Performs a live network fetch for a request descriptor
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<CapturedResponse>;
}

/// Scripted network used by tests and the demo binary: serves registered
/// responses by absolute URL, counts fetches, and can be switched offline.
pub struct ScriptedNetwork {
    responses: Arc<RwLock<HashMap<String, CapturedResponse>>>,
    fetch_counts: Arc<RwLock<HashMap<String, usize>>>,
    offline: Arc<RwLock<bool>>,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            fetch_counts: Arc::new(RwLock::new(HashMap::new())),
            offline: Arc::new(RwLock::new(false)),
        }
    }

    /// Register the response served for an absolute URL
    pub async fn serve(&self, url: impl Into<String>, response: CapturedResponse) {
        let mut responses = self.responses.write().await;
        responses.insert(url.into(), response);
    }

    /// Remove a registered URL so fetching it fails
    pub async fn unserve(&self, url: &str) {
        let mut responses = self.responses.write().await;
        responses.remove(url);
    }

    /// Simulate losing or regaining connectivity
    pub async fn set_offline(&self, offline: bool) {
        *self.offline.write().await = offline;
    }

    /// How many times a URL has been fetched
    pub async fn fetch_count(&self, url: &str) -> usize {
        let counts = self.fetch_counts.read().await;
        counts.get(url).copied().unwrap_or(0)
    }
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkFetcher for ScriptedNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<CapturedResponse> {
        {
            let mut counts = self.fetch_counts.write().await;
            *counts.entry(request.url.clone()).or_insert(0) += 1;
        }

        if *self.offline.read().await {
            return Err(WorkerError::network(&request.url, "offline"));
        }

        let responses = self.responses.read().await;
        responses
            .get(&request.url)
            .cloned()
            .ok_or_else(|| WorkerError::network(&request.url, "host unreachable"))
    }
}
