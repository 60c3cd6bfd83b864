//! Typed client for the iden3 issuer-node credentials API.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/v2/identities/{did}/credentials/{id}` | Fetch credential |
//! | POST   | `/v2/identities/{did}/credentials` | Issue credential |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use refresh_engine::{lookup_with_default, CredentialStore, ServiceError};
use refresh_vc::{CreatedCredential, CredentialEnvelope, UpdateRequest, W3CCredential};

use crate::config::IssuerConfig;
use crate::error::IssuerError;

/// Client for one or more issuer nodes, selected by issuer DID.
#[derive(Debug, Clone)]
pub struct IssuerClient {
    http: reqwest::Client,
    config: Arc<IssuerConfig>,
}

impl IssuerClient {
    pub fn new(config: IssuerConfig) -> Result<Self, IssuerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IssuerError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self::with_http(http, config))
    }

    /// Build on an existing reqwest client.
    pub fn with_http(http: reqwest::Client, config: IssuerConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    /// Get a credential from its issuer node.
    ///
    /// Calls `GET {node}/v2/identities/{did}/credentials/{id}`.
    pub async fn get_credential(
        &self,
        issuer_did: &str,
        credential_id: &str,
    ) -> Result<W3CCredential, IssuerError> {
        let node = self.node_url(issuer_did)?;
        let endpoint = format!("GET /v2/identities/{issuer_did}/credentials/{credential_id}");
        let url = format!("{node}/v2/identities/{issuer_did}/credentials/{credential_id}");
        tracing::info!(issuer = %issuer_did, node = %node, "fetching credential from issuer node");

        let auth = self.basic_auth(issuer_did)?;
        let resp = crate::retry::retry_send(&endpoint, || {
            let mut req = self.http.get(&url);
            if let Some((user, pass)) = &auth {
                req = req.basic_auth(user, Some(pass));
            }
            req.send()
        })
        .await
        .map_err(|e| IssuerError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(IssuerError::NotFound { endpoint });
        }

        if resp.status() != StatusCode::OK {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(IssuerError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        let raw = resp.text().await.map_err(|e| IssuerError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        tracing::debug!(url = %url, body = %raw, "raw issuer node response");

        let envelope: CredentialEnvelope =
            serde_json::from_str(&raw).map_err(|e| IssuerError::Deserialization {
                endpoint,
                reason: e.to_string(),
            })?;
        Ok(envelope.vc)
    }

    /// Ask the issuer node to issue a credential, returning the new id.
    ///
    /// Calls `POST {node}/v2/identities/{did}/credentials`. Sent once: the
    /// call is not idempotent.
    pub async fn create_credential(
        &self,
        issuer_did: &str,
        request: &UpdateRequest,
    ) -> Result<String, IssuerError> {
        let node = self.node_url(issuer_did)?;
        let endpoint = format!("POST /v2/identities/{issuer_did}/credentials");
        let url = format!("{node}/v2/identities/{issuer_did}/credentials");
        tracing::info!(issuer = %issuer_did, node = %node, "requesting credential issuance");

        let mut req = self.http.post(&url).json(request);
        if let Some((user, pass)) = self.basic_auth(issuer_did)? {
            req = req.basic_auth(user, Some(pass));
        }

        let resp = req.send().await.map_err(|e| IssuerError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if resp.status() != StatusCode::CREATED {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(IssuerError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        let created: CreatedCredential =
            resp.json().await.map_err(|e| IssuerError::Deserialization {
                endpoint,
                reason: e.to_string(),
            })?;
        Ok(created.id)
    }

    /// Issuer-node base URL for the DID, without a trailing slash.
    fn node_url(&self, issuer_did: &str) -> Result<String, IssuerError> {
        lookup_with_default(&self.config.supported_issuers, issuer_did)
            .map(|url: &Url| url.as_str().trim_end_matches('/').to_string())
            .ok_or_else(|| IssuerError::IssuerNotSupported(issuer_did.to_string()))
    }

    /// Basic-auth username and password for the DID, if configured.
    fn basic_auth(&self, issuer_did: &str) -> Result<Option<(String, String)>, IssuerError> {
        let Some(secret) = lookup_with_default(&self.config.basic_auth, issuer_did) else {
            tracing::warn!(issuer = %issuer_did, "issuer not found in basic auth map");
            return Ok(None);
        };
        match secret.split_once(':') {
            Some((user, pass)) => Ok(Some((user.to_string(), pass.to_string()))),
            None => Err(IssuerError::InvalidBasicAuth(issuer_did.to_string())),
        }
    }
}

#[async_trait]
impl CredentialStore for IssuerClient {
    async fn fetch(&self, issuer: &str, credential_id: &str) -> Result<W3CCredential, ServiceError> {
        Ok(self.get_credential(issuer, credential_id).await?)
    }

    async fn create(&self, issuer: &str, request: &UpdateRequest) -> Result<String, ServiceError> {
        Ok(self.create_credential(issuer, request).await?)
    }
}
