//! # Verifiable Credential Structure
//!
//! Defines the [`W3CCredential`] envelope as returned by iden3 issuer nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The credential subject: an insertion-ordered map of attribute names to
/// JSON values.
///
/// Iteration order follows the order in which fields appeared in the source
/// document (`serde_json` is built with `preserve_order`).
pub type Subject = Map<String, Value>;

/// Reference to the JSON schema the credential was issued against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchema {
    /// Schema URL.
    #[serde(default)]
    pub id: String,
    /// Schema type, e.g. `JsonSchema2023`.
    #[serde(rename = "type", default)]
    pub schema_type: String,
}

/// Service a holder contacts to refresh this credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshService {
    /// Service endpoint URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Service type, e.g. `Iden3RefreshService2023`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub service_type: String,
}

/// Display metadata attached to a credential by its issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMethod {
    /// Location of the display descriptor.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display method type, e.g. `Iden3BasicDisplayMethodV1`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub method_type: String,
}

/// A W3C Verifiable Credential with iden3 extensions.
///
/// Every envelope field is optional at the type level. Unknown top-level
/// fields are kept in [`extra`](Self::extra) and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct W3CCredential {
    /// JSON-LD context URIs.
    #[serde(rename = "@context", default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    /// Credential identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Credential types, e.g. `["VerifiableCredential", "KYCAgeCredential"]`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<Vec<String>>,
    /// When the credential stops being valid (UTC).
    #[serde(
        rename = "expirationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<DateTime<Utc>>,
    /// When the credential was issued (UTC).
    #[serde(
        rename = "issuanceDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub issuance_date: Option<DateTime<Utc>>,
    /// Subject attributes, including the owner `id` and the subtype `type`.
    #[serde(
        rename = "credentialSubject",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_subject: Option<Subject>,
    /// Revocation status metadata.
    #[serde(
        rename = "credentialStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_status: Option<Value>,
    /// Issuer DID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Schema reference.
    #[serde(
        rename = "credentialSchema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_schema: Option<CredentialSchema>,
    /// Refresh service metadata.
    #[serde(
        rename = "refreshService",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_service: Option<RefreshService>,
    /// Display method metadata.
    #[serde(
        rename = "displayMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_method: Option<DisplayMethod>,
    /// Proof entry or array of proof entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
    /// Any other top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl W3CCredential {
    /// Look up a subject field by name.
    pub fn subject_field(&self, key: &str) -> Option<&Value> {
        self.credential_subject.as_ref()?.get(key)
    }

    /// The schema id, if a schema reference is present.
    pub fn schema_id(&self) -> Option<&str> {
        self.credential_schema.as_ref().map(|s| s.id.as_str())
    }

    /// Iterate over proof entries whether `proof` is a single object or an
    /// array.
    pub fn proofs(&self) -> impl Iterator<Item = &Value> {
        let entries: Vec<&Value> = match &self.proof {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(other @ Value::Object(_)) => vec![other],
            _ => Vec::new(),
        };
        entries.into_iter()
    }
}
