//! # Refresh Orchestrator
//!
//! The top-level refresh pipeline:
//!
//! ```text
//! fetch → validate → eligibility → ownership → subtype → provider
//!       → provide → impact check → merge → nonce → schema → reissue → refetch
//! ```
//!
//! Every step either advances to the next [`RefreshStage`] or aborts with
//! a [`RefreshError`]. The issuer node is only written to after the impact
//! check has confirmed that the update changes the index commitment.
//!
//! ## Fault boundary
//!
//! [`RefreshOrchestrator::process`] runs the pipeline on its own tokio task.
//! A panic inside the pipeline surfaces once, as a `JoinError`, and is
//! mapped to [`RefreshError::Internal`]. It is logged and not retried.
//! Dropping the `process` future aborts the task.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use refresh_vc::{Subject, UpdateRequest, W3CCredential};

use crate::eligibility::{check_ownership, is_updatable};
use crate::error::{ImpactError, ProviderError, RefreshError, StructuralError};
use crate::impact::{ImpactVerdict, IndexImpactAnalyzer};
use crate::revocation::extract_revocation_nonce;
use crate::stage::RefreshStage;
use crate::traits::{Clock, CredentialStore, ProviderFactory, SystemClock};

/// Subject fields a refresh never changes: ownership and subtype.
const IMMUTABLE_SUBJECT_FIELDS: [&str; 2] = ["id", "type"];

/// Validity applied when a provider has none configured.
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(5 * 60);

/// A refresh request: which credential, at which issuer, on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Issuer DID.
    pub issuer: String,
    /// DID of the caller, who must be the credential subject.
    pub owner: String,
    /// Id of the credential to refresh.
    pub credential_id: String,
}

/// Drives a credential refresh through its stages.
#[derive(Clone)]
pub struct RefreshOrchestrator {
    store: Arc<dyn CredentialStore>,
    providers: Arc<dyn ProviderFactory>,
    analyzer: IndexImpactAnalyzer,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RefreshOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshOrchestrator")
            .field("analyzer", &self.analyzer)
            .finish_non_exhaustive()
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop<T>(tokio::task::JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl RefreshOrchestrator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        providers: Arc<dyn ProviderFactory>,
        analyzer: IndexImpactAnalyzer,
    ) -> Self {
        Self {
            store,
            providers,
            analyzer,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock (tests pin "now").
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Refresh a credential, returning the newly issued one.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn process(&self, request: RefreshRequest) -> Result<W3CCredential, RefreshError> {
        let credential_id = request.credential_id.clone();
        let pipeline = self.clone();
        let mut task = AbortOnDrop(tokio::spawn(async move { pipeline.run(request).await }));

        match (&mut task.0).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                tracing::error!(credential_id = %credential_id, "panic recovered in refresh pipeline: {e}");
                Err(RefreshError::Internal(format!(
                    "refresh of credential '{credential_id}' panicked"
                )))
            }
            Err(e) => {
                tracing::error!(credential_id = %credential_id, "refresh task did not complete: {e}");
                Err(RefreshError::Internal(format!(
                    "refresh of credential '{credential_id}' was cancelled"
                )))
            }
        }
    }

    async fn run(&self, request: RefreshRequest) -> Result<W3CCredential, RefreshError> {
        let RefreshRequest {
            issuer,
            owner,
            credential_id,
        } = request;

        tracing::info!(issuer = %issuer, credential_id = %credential_id, "starting credential refresh");

        // -- Fetched ----------------------------------------------------------
        let credential = self
            .store
            .fetch(&issuer, &credential_id)
            .await
            .map_err(|e| RefreshError::external(RefreshStage::Fetched, e))?;
        reached(RefreshStage::Fetched, &credential_id);
        tracing::debug!(
            credential = %serde_json::to_string(&credential).unwrap_or_default(),
            "fetched credential"
        );

        // -- StructurallyValid ------------------------------------------------
        let old_subject = validate_structure(&credential)
            .map_err(|source| RefreshError::Structural {
                stage: RefreshStage::StructurallyValid,
                source,
            })?
            .clone();
        reached(RefreshStage::StructurallyValid, &credential_id);

        // -- Eligible / Owned ---------------------------------------------------
        is_updatable(&credential, self.clock.now()).map_err(|source| {
            RefreshError::Eligibility {
                stage: RefreshStage::Eligible,
                source,
            }
        })?;
        reached(RefreshStage::Eligible, &credential_id);

        check_ownership(&credential, &owner).map_err(|source| RefreshError::Eligibility {
            stage: RefreshStage::Owned,
            source,
        })?;
        reached(RefreshStage::Owned, &credential_id);

        // -- TypeResolved -------------------------------------------------------
        let subtype = subject_type(&old_subject).map_err(|source| RefreshError::Structural {
            stage: RefreshStage::TypeResolved,
            source,
        })?;
        reached(RefreshStage::TypeResolved, &credential_id);

        // -- ProviderResolved ---------------------------------------------------
        let provider = self
            .providers
            .resolve(&subtype)
            .ok_or_else(|| RefreshError::Provider {
                stage: RefreshStage::ProviderResolved,
                source: ProviderError::NotRegistered(subtype.clone()),
            })?;
        reached(RefreshStage::ProviderResolved, &credential_id);

        // -- FieldsUpdated ------------------------------------------------------
        let proposed = provider
            .provide(&old_subject)
            .await
            .map_err(|source| RefreshError::Provider {
                stage: RefreshStage::FieldsUpdated,
                source,
            })?
            .unwrap_or_else(|| {
                tracing::warn!(credential_id = %credential_id, "provider returned no fields, using empty map");
                Subject::new()
            });
        let proposed = without_immutable_fields(&old_subject, proposed, &credential_id)
            .map_err(|source| RefreshError::Provider {
                stage: RefreshStage::FieldsUpdated,
                source,
            })?;

        let validity = match provider.validity() {
            d if d.is_zero() => {
                tracing::warn!(
                    credential_id = %credential_id,
                    "provider validity is unset, using default {DEFAULT_VALIDITY:?}"
                );
                DEFAULT_VALIDITY
            }
            d => d,
        };
        reached(RefreshStage::FieldsUpdated, &credential_id);

        // -- ImpactConfirmed ----------------------------------------------------
        match self
            .analyzer
            .decide(&credential, &old_subject, &proposed)
            .await
        {
            Ok(ImpactVerdict::Updated) => {}
            Ok(ImpactVerdict::NotUpdated) => {
                return Err(RefreshError::IndexImpact {
                    source: ImpactError::NoIndexFieldsUpdated,
                })
            }
            Err(source) => return Err(RefreshError::IndexImpact { source }),
        }
        reached(RefreshStage::ImpactConfirmed, &credential_id);

        let mut merged = old_subject;
        for (field, value) in proposed {
            merged.insert(field, value);
        }

        // -- NonceExtracted -----------------------------------------------------
        let rev_nonce =
            extract_revocation_nonce(&credential).map_err(|source| RefreshError::Serialization {
                stage: RefreshStage::NonceExtracted,
                source,
            })?;
        reached(RefreshStage::NonceExtracted, &credential_id);

        // -- Reissued -----------------------------------------------------------
        let schema_id = match credential.schema_id() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(RefreshError::Structural {
                    stage: RefreshStage::Reissued,
                    source: StructuralError::MissingSchemaId,
                })
            }
        };

        if credential.refresh_service.is_none() {
            tracing::warn!(credential_id = %credential_id, "credential has no refreshService");
        }
        if credential.display_method.is_none() {
            tracing::warn!(credential_id = %credential_id, "credential has no displayMethod");
        }

        let update = UpdateRequest {
            credential_schema: schema_id,
            credential_type: subtype,
            credential_subject: merged,
            expiration: expires_at(self.clock.now(), validity),
            refresh_service: credential.refresh_service.clone(),
            rev_nonce: Some(rev_nonce),
            display_method: credential.display_method.clone(),
        };

        let refreshed_id = self
            .store
            .create(&issuer, &update)
            .await
            .map_err(|e| RefreshError::external(RefreshStage::Reissued, e))?;
        reached(RefreshStage::Reissued, &credential_id);

        // -- Refetched ----------------------------------------------------------
        let refreshed = self
            .store
            .fetch(&issuer, &refreshed_id)
            .await
            .map_err(|e| RefreshError::external(RefreshStage::Refetched, e))?;
        reached(RefreshStage::Refetched, &credential_id);

        tracing::info!(
            issuer = %issuer,
            credential_id = %credential_id,
            refreshed_id = %refreshed_id,
            "credential refreshed"
        );
        Ok(refreshed)
    }
}

fn reached(stage: RefreshStage, credential_id: &str) {
    tracing::debug!(credential_id = %credential_id, stage = %stage, "refresh stage reached");
}

/// Drop `id` and `type` from a proposal. Echoing the current value is
/// tolerated, proposing a different one fails the refresh.
fn without_immutable_fields(
    old_subject: &Subject,
    proposed: Subject,
    credential_id: &str,
) -> Result<Subject, ProviderError> {
    let mut kept = Subject::new();
    for (field, value) in proposed {
        if !IMMUTABLE_SUBJECT_FIELDS.contains(&field.as_str()) {
            kept.insert(field, value);
            continue;
        }
        if old_subject.get(&field) != Some(&value) {
            tracing::warn!(
                credential_id = %credential_id,
                field = %field,
                "provider proposed a new value for an immutable subject field"
            );
            return Err(ProviderError::ImmutableField { field });
        }
        tracing::warn!(
            credential_id = %credential_id,
            field = %field,
            "provider echoed an immutable subject field, dropping it"
        );
    }
    Ok(kept)
}

/// Check the envelope fields every refresh needs and return the subject.
fn validate_structure(credential: &W3CCredential) -> Result<&Subject, StructuralError> {
    if credential.issuer.as_deref().map_or(true, str::is_empty) {
        return Err(StructuralError::MissingIssuer);
    }
    if credential.id.as_deref().map_or(true, str::is_empty) {
        return Err(StructuralError::MissingId);
    }
    if credential.credential_type.is_none() {
        return Err(StructuralError::MissingType);
    }
    if credential.expiration.is_none() {
        return Err(StructuralError::MissingExpiration);
    }
    credential
        .credential_subject
        .as_ref()
        .ok_or(StructuralError::MissingSubject)
}

/// The subject subtype: a non-empty string under `type`.
fn subject_type(subject: &Subject) -> Result<String, StructuralError> {
    match subject.get("type") {
        None | Some(Value::Null) => Err(StructuralError::MissingSubjectType),
        Some(Value::String(subtype)) if !subtype.is_empty() => Ok(subtype.clone()),
        Some(other) => Err(StructuralError::InvalidSubjectType(other.to_string())),
    }
}

/// Unix seconds `validity` after `now`, saturating.
fn expires_at(now: DateTime<Utc>, validity: Duration) -> i64 {
    let secs = i64::try_from(validity.as_secs()).unwrap_or(i64::MAX);
    now.timestamp().saturating_add(secs)
}
