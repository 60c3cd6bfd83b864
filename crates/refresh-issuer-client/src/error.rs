//! Issuer client error types.

use refresh_engine::ServiceError;

/// Errors from issuer-node and document-loader calls.
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The resource does not exist.
    #[error("{endpoint} returned 404")]
    NotFound { endpoint: String },
    /// Unexpected status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },
    /// No issuer node is configured for the DID, and there is no default.
    #[error("issuer is not supported: id '{0}'")]
    IssuerNotSupported(String),
    /// A basic-auth entry is not `user:password`.
    #[error("invalid basic auth for issuer '{0}'")]
    InvalidBasicAuth(String),
    /// The document URI cannot be loaded over HTTP.
    #[error("unsupported document URI: {0}")]
    UnsupportedUri(String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<IssuerError> for ServiceError {
    fn from(err: IssuerError) -> Self {
        match err {
            IssuerError::Http { endpoint, source } => ServiceError::Transport {
                endpoint,
                reason: source.to_string(),
            },
            IssuerError::NotFound { endpoint } => ServiceError::NotFound { resource: endpoint },
            IssuerError::ApiError {
                endpoint,
                status,
                body,
            } => ServiceError::Api {
                endpoint,
                status,
                body,
            },
            IssuerError::Deserialization { endpoint, reason } => {
                ServiceError::MalformedResponse { endpoint, reason }
            }
            IssuerError::IssuerNotSupported(did) => ServiceError::IssuerNotSupported(did),
            other @ (IssuerError::InvalidBasicAuth(_)
            | IssuerError::UnsupportedUri(_)
            | IssuerError::Config(_)) => ServiceError::Config(other.to_string()),
        }
    }
}
