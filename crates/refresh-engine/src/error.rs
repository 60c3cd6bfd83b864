//! # Error Hierarchy
//!
//! Structured error types for the refresh pipeline, built with `thiserror`.
//!
//! [`RefreshError`] is what callers of the orchestrator see. Every variant
//! except [`RefreshError::Internal`] names the [`RefreshStage`] that could
//! not be reached, so operators can tell a fetch failure from a reissue
//! failure without parsing messages.

use thiserror::Error;

use crate::stage::RefreshStage;
use crate::traits::{ClaimError, SlotLookupError};

/// Top-level error type for a credential refresh.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// The credential document is missing a required field.
    #[error("{stage}: malformed credential: {source}")]
    Structural {
        stage: RefreshStage,
        source: StructuralError,
    },

    /// The credential is not expired or is not owned by the caller.
    #[error("{stage}: credential not updatable: {source}")]
    Eligibility {
        stage: RefreshStage,
        source: EligibilityError,
    },

    /// No provider is registered for the subtype, or the provider failed.
    #[error("{stage}: {source}")]
    Provider {
        stage: RefreshStage,
        source: ProviderError,
    },

    /// The proposed update does not touch the index commitment.
    #[error("{}: index update fail: {source}", RefreshStage::ImpactConfirmed)]
    IndexImpact { source: ImpactError },

    /// Transport failure or non-success response from the issuer node or
    /// document loader.
    #[error("{stage}: {source}")]
    ExternalService {
        stage: RefreshStage,
        source: ServiceError,
    },

    /// Malformed request/response body or revocation status.
    #[error("{stage}: {source}")]
    Serialization {
        stage: RefreshStage,
        source: SerializationError,
    },

    /// Unexpected fault inside the pipeline. The message is for operators.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RefreshError {
    /// The stage the pipeline failed to reach, if the failure is a pipeline
    /// failure rather than an internal fault.
    pub fn stage(&self) -> Option<RefreshStage> {
        match self {
            Self::Structural { stage, .. }
            | Self::Eligibility { stage, .. }
            | Self::Provider { stage, .. }
            | Self::ExternalService { stage, .. }
            | Self::Serialization { stage, .. } => Some(*stage),
            Self::IndexImpact { .. } => Some(RefreshStage::ImpactConfirmed),
            Self::Internal(_) => None,
        }
    }

    /// Map a collaborator error into the taxonomy. Malformed bodies are
    /// reported as serialization failures, everything else as external
    /// service failures.
    pub(crate) fn external(stage: RefreshStage, err: ServiceError) -> Self {
        match err {
            ServiceError::MalformedResponse { endpoint, reason } => Self::Serialization {
                stage,
                source: SerializationError::MalformedResponse { endpoint, reason },
            },
            other => Self::ExternalService {
                stage,
                source: other,
            },
        }
    }
}

/// Missing or malformed required credential fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("credential issuer is empty")]
    MissingIssuer,
    #[error("credential ID is empty")]
    MissingId,
    #[error("credential type is missing")]
    MissingType,
    #[error("credential expiration is missing")]
    MissingExpiration,
    #[error("credential subject is missing")]
    MissingSubject,
    #[error("type field missing in credentialSubject")]
    MissingSubjectType,
    #[error("invalid type in credentialSubject: {0}")]
    InvalidSubjectType(String),
    #[error("credential schema ID is empty")]
    MissingSchemaId,
}

/// Eligibility and ownership failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EligibilityError {
    #[error("not expired (expires {expiration})")]
    NotExpired { expiration: String },
    #[error("credential expiration is missing")]
    MissingExpiration,
    #[error("credential subject is missing")]
    MissingSubject,
    #[error("id field missing in credentialSubject")]
    MissingSubjectId,
    #[error("credential subject does not have a valid id")]
    InvalidSubjectId,
    #[error("not owner of the credential")]
    NotOwner,
}

/// Attribute provider failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No provider is configured for the credential subtype.
    #[error("no update provider registered for credential type '{0}'")]
    NotRegistered(String),
    /// The provider's upstream could not be reached.
    #[error("provider request failed: {0}")]
    Transport(String),
    /// The provider's upstream answered with a non-success status.
    #[error("provider upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    /// A request template could not be rendered from the subject.
    #[error("provider template error: {0}")]
    Template(String),
    /// The upstream response did not match the configured response schema.
    #[error("unexpected provider response: {0}")]
    Response(String),
    /// The provider proposed a new value for a subject field that a refresh
    /// must not change.
    #[error("provider attempted to change credentialSubject.{field}")]
    ImmutableField { field: String },
}

/// Index-impact analysis failures.
#[derive(Error, Debug)]
pub enum ImpactError {
    /// No change lands in an index slot, or the root is a value slot.
    #[error("no index fields were updated")]
    NoIndexFieldsUpdated,
    /// The claim oracle could not classify the credential.
    #[error("failed to get merklized position: {0}")]
    Position(#[from] ClaimError),
    /// Slot lookup failed for a reason other than an unconstrained field.
    #[error("failed to resolve field slot: {0}")]
    SlotLookup(#[from] SlotLookupError),
}

/// Collaborator (issuer node, document loader) failures.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The resource does not exist (404 or equivalent).
    #[error("{resource} not found")]
    NotFound { resource: String },
    /// Non-success response.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Transport-level failure (connection, timeout, TLS).
    #[error("transport error calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },
    /// The response body could not be decoded.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    /// The issuer DID has no configured node.
    #[error("issuer is not supported: id '{0}'")]
    IssuerNotSupported(String),
    /// Collaborator misconfiguration (bad auth entry, unsupported URI scheme).
    #[error("configuration error: {0}")]
    Config(String),
}

/// Malformed bodies and revocation metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("invalid credential status")]
    InvalidStatus,
    #[error("revocationNonce not found in credential status")]
    MissingRevocationNonce,
    #[error("revocationNonce is not a number")]
    RevocationNonceNotNumber,
    #[error("revocationNonce is not a non-negative integer: {0}")]
    RevocationNonceOutOfRange(String),
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}
