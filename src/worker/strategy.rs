// Fetch Interception Strategies
//
// Per-request decision between network-first (HTML navigations), cache-first
// (static assets), and passthrough. Only same-origin GET requests outside the
// API and backend-service exclusions are ever intercepted.

use std::sync::Arc;

use log::{debug, warn};
use url::Url;

use crate::config::WorkerConfig;
use crate::worker::best_effort;
use crate::worker::cache::{CacheGeneration, CacheStore};
use crate::worker::error::{Result, WorkerError};
use crate::worker::network::NetworkFetcher;
use crate::worker::types::{
    cache_key, resolve_url, CapturedResponse, FetchRequest, HttpMethod, Intercepted,
    ResponseSource,
};

/// How the interceptor treats a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// HTML navigation, served network-first
    Navigation,
    /// Static asset, served cache-first
    StaticAsset,
    /// Not intercepted at all
    Bypass,
}

/// The fetch interceptor: classifies requests and maintains the cache store
/// according to the strategy each class uses.
pub struct FetchInterceptor {
    config: WorkerConfig,
    origin: Url,
    generation: CacheGeneration,
    cache: Arc<dyn CacheStore>,
    network: Arc<dyn NetworkFetcher>,
}

impl FetchInterceptor {
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
        })
    }

    pub fn generation(&self) -> &CacheGeneration {
        &self.generation
    }

    /// Decide the strategy class for a request without executing it
    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        if !request.is_get() {
            return RequestClass::Bypass;
        }

        let url = match resolve_url(&self.origin, &request.url) {
            Ok(url) => url,
            Err(_) => return RequestClass::Bypass,
        };

        if url.origin() != self.origin.origin() {
            return RequestClass::Bypass;
        }

        if self.is_excluded(&url) {
            return RequestClass::Bypass;
        }

        if request.accepts_html() {
            RequestClass::Navigation
        } else if self.is_static_asset(&url) {
            RequestClass::StaticAsset
        } else {
            RequestClass::Bypass
        }
    }

    /// Run a request through the strategy decided by `classify`.
    ///
    /// Navigations never fail: offline navigations degrade through the
    /// cached entry, the offline fallback page, and finally a synthesized
    /// placeholder. A cache-first miss with no network propagates the fetch
    /// error, since no fallback exists for assets.
    pub async fn handle(&self, request: &FetchRequest) -> Result<Intercepted> {
        match self.classify(request) {
            RequestClass::Bypass => Ok(Intercepted::Passthrough),
            RequestClass::Navigation => {
                let url = resolve_url(&self.origin, &request.url)?;
                Ok(self.network_first(request, &url).await)
            }
            RequestClass::StaticAsset => {
                let url = resolve_url(&self.origin, &request.url)?;
                self.cache_first(request, &url).await
            }
        }
    }

    async fn network_first(&self, request: &FetchRequest, url: &Url) -> Intercepted {
        let cache_name = self.generation.name();
        let key = cache_key(request.method, url);

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    best_effort(
                        "navigation cache write",
                        self.cache.put(&cache_name, &key, response.clone()),
                    )
                    .await;
                }
                Intercepted::Response {
                    response,
                    source: ResponseSource::Network,
                }
            }
            Err(err) => {
                warn!("network-first fetch failed for {url}: {err}");

                if let Ok(Some(cached)) = self.cache.get(&cache_name, &key).await {
                    return Intercepted::Response {
                        response: cached,
                        source: ResponseSource::Cache,
                    };
                }

                if let Some(offline) = self.offline_fallback(&cache_name).await {
                    return Intercepted::Response {
                        response: offline,
                        source: ResponseSource::OfflineFallback,
                    };
                }

                debug!("offline fallback missing for {url}, synthesizing placeholder");
                Intercepted::Response {
                    response: CapturedResponse::offline_placeholder(),
                    source: ResponseSource::Placeholder,
                }
            }
        }
    }

    async fn cache_first(&self, request: &FetchRequest, url: &Url) -> Result<Intercepted> {
        let cache_name = self.generation.name();
        let key = cache_key(request.method, url);

        if let Ok(Some(cached)) = self.cache.get(&cache_name, &key).await {
            return Ok(Intercepted::Response {
                response: cached,
                source: ResponseSource::Cache,
            });
        }

        let response = self.network.fetch(request).await?;
        if response.is_success() {
            best_effort(
                "asset cache write",
                self.cache.put(&cache_name, &key, response.clone()),
            )
            .await;
        }

        Ok(Intercepted::Response {
            response,
            source: ResponseSource::Network,
        })
    }

    /// Cached offline fallback page, if it was pre-populated
    async fn offline_fallback(&self, cache_name: &str) -> Option<CapturedResponse> {
        let offline_url = resolve_url(&self.origin, &self.config.offline_path).ok()?;
        let key = cache_key(HttpMethod::Get, &offline_url);
        self.cache.get(cache_name, &key).await.ok().flatten()
    }

    fn is_excluded(&self, url: &Url) -> bool {
        let path = url.path();
        if self
            .config
            .api_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return true;
        }
        url.as_str().contains(&self.config.backend_marker)
    }

    fn is_static_asset(&self, url: &Url) -> bool {
        let path = url.path();
        self.config
            .asset_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            || self
                .config
                .asset_extensions
                .iter()
                .any(|ext| path.ends_with(ext.as_str()))
    }
}
