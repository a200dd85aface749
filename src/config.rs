// Application configuration
//
// One TOML file drives the worker, push, and notification sections. Every
// field has a default so a missing file or a partial file still yields a
// working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration for the delivery core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Interception layer settings: origin, cache generation, pre-cache
/// manifest, and the request classification rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Application origin; requests outside it are never intercepted
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Logical cache name prefix
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,
    /// Deployed version tag embedded in the cache name
    #[serde(default = "default_cache_version")]
    pub cache_version: String,
    /// Paths fetched and stored at install time
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
    /// Path of the offline fallback page; must appear in `precache`
    #[serde(default = "default_offline_path")]
    pub offline_path: String,
    /// Path prefixes that must always bypass the cache
    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,
    /// Backend-service marker; URLs containing it always go to network
    #[serde(default = "default_backend_marker")]
    pub backend_marker: String,
    /// Path prefixes served cache-first
    #[serde(default = "default_asset_prefixes")]
    pub asset_prefixes: Vec<String>,
    /// File extensions served cache-first
    #[serde(default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            precache: default_precache(),
            offline_path: default_offline_path(),
            api_prefixes: default_api_prefixes(),
            backend_marker: default_backend_marker(),
            asset_prefixes: default_asset_prefixes(),
            asset_extensions: default_asset_extensions(),
        }
    }
}

/// Push channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Application-wide public server key used for every channel subscription
    #[serde(default = "default_application_server_key")]
    pub application_server_key: String,
    /// User agent label persisted alongside subscription records
    pub user_agent: Option<String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            application_server_key: default_application_server_key(),
            user_agent: None,
        }
    }
}

/// Defaults merged over partial or unparseable notification payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_title")]
    pub default_title: String,
    #[serde(default = "default_body")]
    pub default_body: String,
    #[serde(default = "default_url")]
    pub default_url: String,
    #[serde(default = "default_tag")]
    pub default_tag: String,
    /// Target of the structured "read" notification action
    #[serde(default = "default_devotional_url")]
    pub devotional_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            default_body: default_body(),
            default_url: default_url(),
            default_tag: default_tag(),
            devotional_url: default_devotional_url(),
        }
    }
}

// Default value functions
fn default_origin() -> String {
    "https://cleave.app".to_string()
}
fn default_cache_prefix() -> String {
    "threefold".to_string()
}
fn default_cache_version() -> String {
    "v1".to_string()
}
fn default_precache() -> Vec<String> {
    vec![
        "/".to_string(),
        "/dashboard".to_string(),
        "/devotional".to_string(),
        "/assessments".to_string(),
        "/offline".to_string(),
        "/manifest.json".to_string(),
        "/icons/icon-192.png".to_string(),
        "/icons/icon-512.png".to_string(),
    ]
}
fn default_offline_path() -> String {
    "/offline".to_string()
}
fn default_api_prefixes() -> Vec<String> {
    vec!["/api/".to_string()]
}
fn default_backend_marker() -> String {
    "supabase.co".to_string()
}
fn default_asset_prefixes() -> Vec<String> {
    vec![
        "/icons/".to_string(),
        "/images/".to_string(),
        "/fonts/".to_string(),
    ]
}
fn default_asset_extensions() -> Vec<String> {
    vec![
        ".png".to_string(),
        ".jpg".to_string(),
        ".jpeg".to_string(),
        ".svg".to_string(),
        ".webp".to_string(),
        ".ico".to_string(),
        ".woff".to_string(),
        ".woff2".to_string(),
    ]
}
fn default_application_server_key() -> String {
    "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM"
        .to_string()
}
fn default_title() -> String {
    "Cleave".to_string()
}
fn default_body() -> String {
    "You have a new notification".to_string()
}
fn default_url() -> String {
    "/dashboard".to_string()
}
fn default_tag() -> String {
    "cleave-general".to_string()
}
fn default_devotional_url() -> String {
    "/devotional/today".to_string()
}
