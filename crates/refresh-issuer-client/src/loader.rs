//! HTTP JSON-LD document loader with an in-process cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use refresh_engine::{DocumentLoader, RemoteDocument, ServiceError};

use crate::error::IssuerError;

const ACCEPT_JSON_LD: &str = "application/ld+json, application/json";

/// Default number of documents kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Loads `http(s)://` and `ipfs://` documents. Successful loads are cached
/// by URI for the lifetime of the loader, up to a fixed number of entries.
/// Once the cache is full, further documents are fetched on every load.
#[derive(Clone)]
pub struct HttpDocumentLoader {
    http: reqwest::Client,
    ipfs_gateway: Option<Url>,
    cache: Arc<RwLock<HashMap<String, RemoteDocument>>>,
    capacity: usize,
}

impl std::fmt::Debug for HttpDocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDocumentLoader")
            .field("ipfs_gateway", &self.ipfs_gateway)
            .field("cached", &self.cache.read().len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl HttpDocumentLoader {
    pub fn new(timeout: Duration, ipfs_gateway: Option<Url>) -> Result<Self, IssuerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IssuerError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self::with_http(http, ipfs_gateway))
    }

    pub fn with_http(http: reqwest::Client, ipfs_gateway: Option<Url>) -> Self {
        Self {
            http,
            ipfs_gateway,
            cache: Arc::new(RwLock::new(HashMap::new())),
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Cap the number of cached documents.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// The URL a document URI is fetched from.
    pub fn resolve_url(&self, uri: &str) -> Result<String, IssuerError> {
        if let Some(cid) = uri.strip_prefix("ipfs://") {
            let gateway = self.ipfs_gateway.as_ref().ok_or_else(|| {
                IssuerError::UnsupportedUri(format!("{uri} (no IPFS gateway configured)"))
            })?;
            return Ok(format!(
                "{}/ipfs/{cid}",
                gateway.as_str().trim_end_matches('/')
            ));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Ok(uri.to_string());
        }
        Err(IssuerError::UnsupportedUri(uri.to_string()))
    }

    async fn fetch(&self, uri: &str) -> Result<RemoteDocument, IssuerError> {
        let url = self.resolve_url(uri)?;
        let endpoint = format!("GET {url}");

        let resp = crate::retry::retry_send(&endpoint, || {
            self.http.get(&url).header(ACCEPT, ACCEPT_JSON_LD).send()
        })
        .await
        .map_err(|e| IssuerError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(IssuerError::NotFound { endpoint });
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(IssuerError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        let document_url = resp.url().to_string();
        let document: Value = resp.json().await.map_err(|e| IssuerError::Deserialization {
            endpoint,
            reason: e.to_string(),
        })?;

        Ok(RemoteDocument {
            document_url,
            document,
        })
    }
}

#[async_trait]
impl DocumentLoader for HttpDocumentLoader {
    async fn load(&self, uri: &str) -> Result<RemoteDocument, ServiceError> {
        let cached = self.cache.read().get(uri).cloned();
        if let Some(hit) = cached {
            tracing::trace!(uri = %uri, "document cache hit");
            return Ok(hit);
        }

        let remote = self.fetch(uri).await?;
        {
            let mut cache = self.cache.write();
            if cache.len() < self.capacity {
                cache.insert(uri.to_string(), remote.clone());
            } else {
                tracing::debug!(uri = %uri, capacity = self.capacity, "document cache full, not caching");
            }
        }
        Ok(remote)
    }
}
