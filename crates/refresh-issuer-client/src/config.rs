//! Issuer client configuration.
//!
//! Maps issuer DIDs to issuer-node base URLs and basic-auth credentials.
//! Both maps accept a `*` key used for any issuer without its own entry.

use std::collections::HashMap;

use url::Url;
use zeroize::Zeroizing;

/// Configuration for issuer-node and document-loader HTTP access.
///
/// Custom `Debug` implementation redacts the basic-auth secrets.
#[derive(Clone)]
pub struct IssuerConfig {
    /// Issuer DID (or `*`) to issuer-node base URL.
    pub supported_issuers: HashMap<String, Url>,
    /// Issuer DID (or `*`) to `user:password`.
    pub basic_auth: HashMap<String, Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Gateway used to resolve `ipfs://` context URIs.
    pub ipfs_gateway: Option<Url>,
}

impl std::fmt::Debug for IssuerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth_keys: Vec<&String> = self.basic_auth.keys().collect();
        f.debug_struct("IssuerConfig")
            .field("supported_issuers", &self.supported_issuers)
            .field("basic_auth", &format_args!("[REDACTED] for {auth_keys:?}"))
            .field("timeout_secs", &self.timeout_secs)
            .field("ipfs_gateway", &self.ipfs_gateway)
            .finish()
    }
}

impl IssuerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `REFRESH_SUPPORTED_ISSUERS` (required): `did=url` pairs, comma separated
    /// - `REFRESH_ISSUERS_BASIC_AUTH`: `did=user:password` pairs, comma separated
    /// - `REFRESH_HTTP_TIMEOUT_SECS` (default: 30)
    /// - `REFRESH_IPFS_GATEWAY`: base URL of an IPFS HTTP gateway
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("REFRESH_SUPPORTED_ISSUERS")
            .map_err(|_| ConfigError::MissingSupportedIssuers)?;
        let supported_issuers = parse_supported_issuers(&raw)?;

        let basic_auth = match std::env::var("REFRESH_ISSUERS_BASIC_AUTH") {
            Ok(raw) => parse_basic_auth(&raw)?,
            Err(_) => HashMap::new(),
        };

        let ipfs_gateway = match std::env::var("REFRESH_IPFS_GATEWAY") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_url("REFRESH_IPFS_GATEWAY", raw.trim())?),
            _ => None,
        };

        Ok(Self {
            supported_issuers,
            basic_auth,
            timeout_secs: std::env::var("REFRESH_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            ipfs_gateway,
        })
    }

    /// A configuration routing every issuer to one node, without auth.
    pub fn single_node(node: Url) -> Self {
        Self {
            supported_issuers: HashMap::from([(refresh_engine::WILDCARD.to_string(), node)]),
            basic_auth: HashMap::new(),
            timeout_secs: 5,
            ipfs_gateway: None,
        }
    }
}

/// Parse `did=url,did=url`.
pub fn parse_supported_issuers(raw: &str) -> Result<HashMap<String, Url>, ConfigError> {
    let pairs = parse_pairs("REFRESH_SUPPORTED_ISSUERS", raw)?;
    if pairs.is_empty() {
        return Err(ConfigError::MissingSupportedIssuers);
    }
    pairs
        .into_iter()
        .map(|(did, url)| Ok((did, parse_url("REFRESH_SUPPORTED_ISSUERS", &url)?)))
        .collect()
}

/// Parse `did=user:password,did=user:password`.
pub fn parse_basic_auth(raw: &str) -> Result<HashMap<String, Zeroizing<String>>, ConfigError> {
    Ok(parse_pairs("REFRESH_ISSUERS_BASIC_AUTH", raw)?
        .into_iter()
        .map(|(did, secret)| (did, Zeroizing::new(secret)))
        .collect())
}

fn parse_pairs(var: &str, raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            // never echo the entry: it may hold a password
            _ => Err(ConfigError::InvalidPair(var.to_string())),
        })
        .collect()
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("REFRESH_SUPPORTED_ISSUERS environment variable is required")]
    MissingSupportedIssuers,
    #[error("malformed key=value entry in {0}")]
    InvalidPair(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
