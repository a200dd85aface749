// Worker Lifecycle
//
// Install pre-populates the current cache generation and skips waiting;
// activate evicts every stale generation and claims open clients. There is
// no rollback: once a generation is evicted it cannot be restored.

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};
use tokio::sync::RwLock;
use url::Url;

use crate::config::WorkerConfig;
use crate::worker::best_effort;
use crate::worker::cache::{CacheGeneration, CacheStore};
use crate::worker::error::{Result, WorkerError};
use crate::worker::network::NetworkFetcher;
use crate::worker::types::{cache_key, resolve_url, FetchRequest, HttpMethod};

/// Lifecycle phases of the interception layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Constructed, not yet installed
    Parsed,
    /// Install event in progress (pre-cache population)
    Installing,
    /// Installed; skip-waiting makes this immediately eligible to activate
    Installed,
    /// Activate event in progress (stale generation eviction)
    Activating,
    /// Active and controlling clients
    Active,
}

impl WorkerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerPhase::Parsed => "parsed",
            WorkerPhase::Installing => "installing",
            WorkerPhase::Installed => "installed",
            WorkerPhase::Activating => "activating",
            WorkerPhase::Active => "active",
        }
    }
}

/// Manages cache population and eviction across version boundaries
pub struct LifecycleManager {
    config: WorkerConfig,
    origin: Url,
    generation: CacheGeneration,
    cache: Arc<dyn CacheStore>,
    network: Arc<dyn NetworkFetcher>,
    phase: Arc<RwLock<WorkerPhase>>,
    claimed: Arc<RwLock<bool>>,
}

impl LifecycleManager {
    pub fn new(
        config: WorkerConfig,
        cache: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkFetcher>,
    ) -> Result<Self> {
        let origin = Url::parse(&config.origin)
            .map_err(|_| WorkerError::InvalidUrl(config.origin.clone()))?;
        let generation = CacheGeneration::new(&config.cache_prefix, &config.cache_version);

        Ok(Self {
            config,
            origin,
            generation,
            cache,
            network,
            phase: Arc::new(RwLock::new(WorkerPhase::Parsed)),
            claimed: Arc::new(RwLock::new(false)),
        })
    }

    pub fn generation(&self) -> &CacheGeneration {
        &self.generation
    }

    pub async fn phase(&self) -> WorkerPhase {
        *self.phase.read().await
    }

    /// Whether this version has taken control of open clients
    pub async fn is_claimed(&self) -> bool {
        *self.claimed.read().await
    }

    /// Install: pre-fetch the configured entry points into the current
    /// generation. Each entry is attempted independently; individual
    /// failures never abort the batch or fail installation. Skip-waiting:
    /// the phase moves to `Installed` without waiting on a previous version.
    pub async fn install(&self) -> Result<()> {
        self.transition(&[WorkerPhase::Parsed], WorkerPhase::Installing)
            .await?;

        let attempts = join_all(
            self.config
                .precache
                .iter()
                .map(|path| best_effort("pre-cache entry", self.precache_entry(path))),
        )
        .await;

        let stored = attempts.iter().filter(|outcome| outcome.is_some()).count();
        info!(
            "installed cache generation {}: pre-cached {}/{} entries",
            self.generation.name(),
            stored,
            attempts.len()
        );

        debug!("skip waiting: {} eligible to activate immediately", self.generation.name());
        self.transition(&[WorkerPhase::Installing], WorkerPhase::Installed)
            .await
    }

    /// Activate: delete every cache generation other than the current one,
    /// then claim all open clients so the new interception logic applies
    /// without a reload.
    pub async fn activate(&self) -> Result<()> {
        self.transition(&[WorkerPhase::Installed], WorkerPhase::Activating)
            .await?;

        let names = match self.cache.cache_names().await {
            Ok(names) => names,
            Err(err) => {
                warn!("could not enumerate cache generations: {err}");
                Vec::new()
            }
        };

        for name in names {
            if !self.generation.is_stale(&name) {
                continue;
            }
            match self.cache.delete_cache(&name).await {
                Ok(_) => debug!("evicted stale cache generation {name}"),
                Err(err) => warn!("failed to evict stale cache generation {name}: {err}"),
            }
        }

        *self.claimed.write().await = true;
        info!("activated cache generation {}, claimed clients", self.generation.name());

        self.transition(&[WorkerPhase::Activating], WorkerPhase::Active)
            .await
    }

    /// Fetch one pre-cache entry and store it under the current generation
    async fn precache_entry(&self, path: &str) -> Result<()> {
        let url = resolve_url(&self.origin, path)?;
        let request = FetchRequest::get(url.as_str());

        let response = self.network.fetch(&request).await?;
        if !response.is_success() {
            return Err(WorkerError::network(
                url.as_str(),
                format!("status {}", response.status),
            ));
        }

        self.cache
            .put(
                &self.generation.name(),
                &cache_key(HttpMethod::Get, &url),
                response,
            )
            .await
    }

    async fn transition(&self, allowed_from: &[WorkerPhase], to: WorkerPhase) -> Result<()> {
        let mut phase = self.phase.write().await;
        if !allowed_from.contains(&*phase) {
            return Err(WorkerError::InvalidTransition {
                from: phase.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        *phase = to;
        Ok(())
    }
}
