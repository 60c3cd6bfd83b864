//! # Collaborator Seams
//!
//! Traits for everything the refresh engine consumes but does not own:
//! credential transport, JSON-LD document loading, attribute providers, and
//! claim parsing. All traits are object-safe and `Send + Sync` so that
//! implementations can be shared across concurrent refreshes behind an
//! `Arc`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use refresh_vc::{Subject, UpdateRequest, W3CCredential};

use crate::error::{ProviderError, ServiceError};

/// Issuer-node access: read an existing credential, request a new one.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a credential by issuer DID and credential id.
    async fn fetch(&self, issuer: &str, credential_id: &str)
        -> Result<W3CCredential, ServiceError>;

    /// Ask the issuer node to issue a credential, returning its id.
    async fn create(&self, issuer: &str, request: &UpdateRequest) -> Result<String, ServiceError>;
}

/// A JSON-LD document as returned by a [`DocumentLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// The URL the document was finally loaded from.
    pub document_url: String,
    /// Parsed document body.
    pub document: Value,
}

/// Resolves JSON-LD context URIs to documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, uri: &str) -> Result<RemoteDocument, ServiceError>;
}

/// A source of updated attribute values for one credential subtype.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Produce proposed field values from the current subject. `Ok(None)`
    /// means "no fields changed".
    async fn provide(&self, subject: &Subject) -> Result<Option<Subject>, ProviderError>;

    /// How long a refreshed credential stays valid. Zero means unset.
    fn validity(&self) -> Duration;
}

/// Looks up the provider for a credential subtype.
pub trait ProviderFactory: Send + Sync {
    fn resolve(&self, subtype: &str) -> Option<Arc<dyn Provider>>;
}

/// How a credential's subject is committed in its claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MerklizedRootPosition {
    /// The whole subject is one index value.
    Index,
    /// The whole subject is one non-index value.
    Value,
    /// Not merklized: fields occupy individual slots.
    None,
}

impl fmt::Display for MerklizedRootPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::Value => write!(f, "value"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Failure to classify a credential's claim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("credential has no core claim")]
    MissingCoreClaim,
    #[error("invalid core claim: {0}")]
    InvalidCoreClaim(String),
}

/// Failure to resolve a field's slot index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotLookupError {
    /// The schema's serialization info does not name the field. The
    /// analyzer treats this as "the field may land in an index slot".
    #[error("field `{field}` not specified in serialization info")]
    NotInSerializationInfo { field: String },
    #[error("credential type `{subtype}` not found in context")]
    TypeNotFound { subtype: String },
    #[error("serialization info is not set for type `{subtype}`")]
    MissingSerializationInfo { subtype: String },
    #[error("invalid serialization info: {0}")]
    InvalidSerializationInfo(String),
}

/// Claim parsing oracle: merklized root position and per-field slot
/// indices.
pub trait ClaimOracle: Send + Sync {
    fn merklized_position(
        &self,
        credential: &W3CCredential,
    ) -> Result<MerklizedRootPosition, ClaimError>;

    /// Slot index of `field` for `subtype`, using the aggregated context
    /// document (`{"@context": [...]}`).
    fn field_slot_index(
        &self,
        field: &str,
        subtype: &str,
        context: &Value,
    ) -> Result<u8, SlotLookupError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
