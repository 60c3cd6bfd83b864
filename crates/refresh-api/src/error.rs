//! # API Errors
//!
//! Every failure is answered as `{"error": {"code", "message", "stage"}}`.
//! Pipeline failures carry the [`RefreshStage`] the refresh failed to reach,
//! so a client can tell a rejected refresh from an unreachable issuer.
//! Internal faults are logged and answered with a generic message.
//!
//! [`RefreshStage`]: refresh_engine::RefreshStage

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use refresh_engine::{EligibilityError, ProviderError, RefreshError, ServiceError};

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code, e.g. `NOT_UPDATABLE`.
    pub code: String,
    pub message: String,
    /// Pipeline stage that was not reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

/// Failure of an API request.
#[derive(Error, Debug)]
pub enum AppError {
    /// Body is not valid JSON for the endpoint (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A request field failed validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// The refresh pipeline rejected the credential or could not reach a
    /// collaborator.
    #[error("{source}")]
    Refresh {
        status: StatusCode,
        code: &'static str,
        source: RefreshError,
    },

    /// The refresh did not finish within the request timeout (504).
    #[error("refresh did not complete within {0:?}")]
    Timeout(Duration),

    /// Logged, never described to the client (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Refresh { status, code, .. } => (*status, *code),
            Self::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, stage) = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                ("An internal error occurred".to_string(), None)
            }
            Self::Refresh { source, .. } => (source.to_string(), source.stage()),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                stage: stage.map(|s| s.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RefreshError> for AppError {
    fn from(err: RefreshError) -> Self {
        let (status, code) = match &err {
            RefreshError::Internal(detail) => return Self::Internal(detail.clone()),
            RefreshError::ExternalService {
                source: ServiceError::Config(_),
                ..
            } => return Self::Internal(err.to_string()),

            RefreshError::Structural { .. }
            | RefreshError::Serialization { .. }
            | RefreshError::Provider {
                source: ProviderError::NotRegistered(_),
                ..
            }
            | RefreshError::ExternalService {
                source: ServiceError::IssuerNotSupported(_),
                ..
            } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),

            RefreshError::Eligibility {
                source: EligibilityError::NotOwner,
                ..
            } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            RefreshError::Eligibility { .. } | RefreshError::IndexImpact { .. } => {
                (StatusCode::CONFLICT, "NOT_UPDATABLE")
            }

            RefreshError::ExternalService {
                source: ServiceError::NotFound { .. },
                ..
            } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            RefreshError::Provider { .. } | RefreshError::ExternalService { .. } => {
                (StatusCode::BAD_GATEWAY, "BAD_GATEWAY")
            }
        };
        Self::Refresh {
            status,
            code,
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refresh_engine::{ImpactError, RefreshStage, StructuralError};

    fn status_of(err: RefreshError) -> (StatusCode, &'static str) {
        AppError::from(err).status_and_code()
    }

    #[test]
    fn structural_is_validation() {
        let err = RefreshError::Structural {
            stage: RefreshStage::StructurallyValid,
            source: StructuralError::MissingIssuer,
        };
        assert_eq!(
            status_of(err),
            (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
        );
    }

    #[test]
    fn not_owner_is_forbidden() {
        let err = RefreshError::Eligibility {
            stage: RefreshStage::Owned,
            source: EligibilityError::NotOwner,
        };
        assert_eq!(status_of(err), (StatusCode::FORBIDDEN, "FORBIDDEN"));
    }

    #[test]
    fn not_expired_and_no_impact_are_conflicts() {
        let err = RefreshError::Eligibility {
            stage: RefreshStage::Eligible,
            source: EligibilityError::NotExpired {
                expiration: "2030-01-01T00:00:00Z".into(),
            },
        };
        assert_eq!(status_of(err), (StatusCode::CONFLICT, "NOT_UPDATABLE"));

        let err = RefreshError::IndexImpact {
            source: ImpactError::NoIndexFieldsUpdated,
        };
        assert_eq!(status_of(err), (StatusCode::CONFLICT, "NOT_UPDATABLE"));
    }

    #[test]
    fn unregistered_provider_is_validation_but_failing_provider_is_gateway() {
        let err = RefreshError::Provider {
            stage: RefreshStage::ProviderResolved,
            source: ProviderError::NotRegistered("X".into()),
        };
        assert_eq!(status_of(err).0, StatusCode::UNPROCESSABLE_ENTITY);

        let err = RefreshError::Provider {
            stage: RefreshStage::FieldsUpdated,
            source: ProviderError::Transport("refused".into()),
        };
        assert_eq!(status_of(err), (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"));

        let err = RefreshError::Provider {
            stage: RefreshStage::FieldsUpdated,
            source: ProviderError::ImmutableField { field: "id".into() },
        };
        assert_eq!(status_of(err), (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"));
    }

    #[test]
    fn issuer_errors() {
        let err = RefreshError::ExternalService {
            stage: RefreshStage::Fetched,
            source: ServiceError::NotFound {
                resource: "credential".into(),
            },
        };
        assert_eq!(status_of(err), (StatusCode::NOT_FOUND, "NOT_FOUND"));

        let err = RefreshError::ExternalService {
            stage: RefreshStage::Reissued,
            source: ServiceError::Api {
                endpoint: "POST /credentials".into(),
                status: 500,
                body: String::new(),
            },
        };
        assert_eq!(status_of(err).0, StatusCode::BAD_GATEWAY);

        let err = RefreshError::ExternalService {
            stage: RefreshStage::Fetched,
            source: ServiceError::IssuerNotSupported("did:iden3:x".into()),
        };
        assert_eq!(status_of(err).0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_faults_stay_internal() {
        let err = AppError::from(RefreshError::Internal("task panicked".into()));
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        let err = AppError::Timeout(Duration::from_secs(60));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT")
        );
    }
}
