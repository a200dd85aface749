// Core Worker Data Structures

use serde::{Deserialize, Serialize};
use url::Url;

use crate::worker::error::{Result, WorkerError};

/// Name of a named cache inside the cache store
pub type CacheName = String;

/// HTTP methods the interceptor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// A request descriptor as seen by the fetch interceptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub method: HttpMethod,
    /// Absolute URL, or a path resolved against the configured origin
    pub url: String,
    /// Value of the Accept header, if any
    pub accept: Option<String>,
}

impl FetchRequest {
    /// Plain GET request with no Accept header (static assets, manifest)
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            accept: None,
        }
    }

    /// GET request accepting HTML, as issued by a page navigation
    pub fn navigation(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            accept: Some("text/html,application/xhtml+xml".to_string()),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == HttpMethod::Get
    }

    /// Whether the Accept header indicates an HTML navigation
    pub fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .map(|a| a.contains("text/html"))
            .unwrap_or(false)
    }
}

/// Resolve a raw URL or path against the application origin
pub fn resolve_url(origin: &Url, raw: &str) -> Result<Url> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(_) => origin
            .join(raw)
            .map_err(|_| WorkerError::InvalidUrl(raw.to_string())),
    }
}

/// Normalized cache key for a request: method plus absolute URL
pub fn cache_key(method: HttpMethod, url: &Url) -> String {
    format!("{} {}", method.as_str(), url)
}

/// A captured response snapshot: status, headers, body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// 200 OK with the given body
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body.into())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Synthesized response for a navigation that found neither a cached
    /// entry nor a pre-populated offline page
    pub fn offline_placeholder() -> Self {
        Self::new(503, b"offline".to_vec())
            .with_header("Content-Type", "text/plain")
    }
}

/// Where an intercepted response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live network response
    Network,
    /// Matching entry in the cache store
    Cache,
    /// The pre-populated offline fallback page
    OfflineFallback,
    /// Synthesized placeholder (offline page was never pre-cached)
    Placeholder,
}

/// Result of running a request through the interceptor
#[derive(Debug, Clone)]
pub enum Intercepted {
    /// The interceptor produced a response
    Response {
        response: CapturedResponse,
        source: ResponseSource,
    },
    /// Request is not intercepted; caller proceeds with a normal fetch
    Passthrough,
}

impl Intercepted {
    pub fn response(&self) -> Option<&CapturedResponse> {
        match self {
            Intercepted::Response { response, .. } => Some(response),
            Intercepted::Passthrough => None,
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Intercepted::Response { source, .. } => Some(*source),
            Intercepted::Passthrough => None,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Intercepted::Passthrough)
    }
}
