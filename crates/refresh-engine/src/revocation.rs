//! Revocation nonce extraction from `credentialStatus`.

use serde_json::Value;

use refresh_vc::W3CCredential;

use crate::error::SerializationError;

/// Read `credentialStatus.revocationNonce` as a `u64`.
///
/// Integral JSON numbers are accepted whether encoded as integers or as
/// floats with no fractional part (`5` and `5.0`). There is no default.
pub fn extract_revocation_nonce(credential: &W3CCredential) -> Result<u64, SerializationError> {
    let status = match &credential.credential_status {
        Some(Value::Object(status)) => status,
        _ => return Err(SerializationError::InvalidStatus),
    };

    let nonce = status
        .get("revocationNonce")
        .ok_or(SerializationError::MissingRevocationNonce)?;

    let Value::Number(number) = nonce else {
        return Err(SerializationError::RevocationNonceNotNumber);
    };

    if let Some(n) = number.as_u64() {
        return Ok(n);
    }

    match number.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(f as u64)
        }
        _ => Err(SerializationError::RevocationNonceOutOfRange(number.to_string())),
    }
}
