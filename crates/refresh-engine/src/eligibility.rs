//! # Refresh Eligibility
//!
//! A credential may be refreshed only once it has expired, and only by the
//! subject it was issued to.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use refresh_vc::W3CCredential;

use crate::error::EligibilityError;

/// Check that the credential is stale and names a usable owner.
///
/// Fails when the expiration is after `now`, or when `credentialSubject.id`
/// is missing, null, not a string, or blank after trimming. A credential
/// expiring exactly at `now` is updatable.
pub fn is_updatable(credential: &W3CCredential, now: DateTime<Utc>) -> Result<(), EligibilityError> {
    let expiration = credential
        .expiration
        .ok_or(EligibilityError::MissingExpiration)?;

    if expiration > now {
        return Err(EligibilityError::NotExpired {
            expiration: expiration.to_rfc3339_opts(SecondsFormat::Secs, true),
        });
    }

    let subject = credential
        .credential_subject
        .as_ref()
        .ok_or(EligibilityError::MissingSubject)?;

    match subject.get("id") {
        None => Err(EligibilityError::MissingSubjectId),
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(()),
        Some(_) => Err(EligibilityError::InvalidSubjectId),
    }
}

/// Check that `owner` is exactly the credential's subject id.
///
/// Comparison is byte-for-byte: case-sensitive, no trimming, no DID
/// normalization.
pub fn check_ownership(credential: &W3CCredential, owner: &str) -> Result<(), EligibilityError> {
    let subject = credential
        .credential_subject
        .as_ref()
        .ok_or(EligibilityError::MissingSubject)?;

    match subject.get("id") {
        None => Err(EligibilityError::MissingSubjectId),
        Some(Value::String(id)) if id == owner => Ok(()),
        Some(_) => Err(EligibilityError::NotOwner),
    }
}
