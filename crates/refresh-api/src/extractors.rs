//! # Custom Extractors & Validation
//!
//! The [`Validate`] trait for request DTOs and a helper to extract and
//! validate JSON bodies in handlers.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use refresh_engine::RefreshRequest;

use crate::error::AppError;

/// Business-rule checks beyond what serde deserialization enforces.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), String> {
        let blank = [
            ("issuer", &self.issuer),
            ("owner", &self.owner),
            ("credentialId", &self.credential_id),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match blank {
            Some((field, _)) => Err(format!("{field} must not be empty")),
            None => Ok(()),
        }
    }
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
