//! Issuer node request and response bodies.

use serde::{Deserialize, Serialize};

use crate::credential::{DisplayMethod, RefreshService, Subject, W3CCredential};

/// Body of `POST /v2/identities/{did}/credentials`, asking the issuer node
/// to issue a replacement credential.
///
/// Optional fields are omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// Schema URL of the credential being replaced.
    pub credential_schema: String,
    /// Credential subtype (`credentialSubject.type`).
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Merged subject attributes.
    pub credential_subject: Subject,
    /// New expiration, unix seconds.
    pub expiration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_service: Option<RefreshService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_nonce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_method: Option<DisplayMethod>,
}

/// Body of `GET /v2/identities/{did}/credentials/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialEnvelope {
    pub vc: W3CCredential,
}

/// Body of a successful credential creation (`201 Created`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreatedCredential {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subject() -> Subject {
        let mut subject = Subject::new();
        subject.insert("id".into(), json!("did:iden3:owner"));
        subject.insert("birthday".into(), json!(19960425));
        subject.insert("type".into(), json!("KYCAgeCredential"));
        subject
    }

    #[test]
    fn update_request_uses_issuer_node_field_names() {
        let req = UpdateRequest {
            credential_schema: "https://schemas/kyc.json".into(),
            credential_type: "KYCAgeCredential".into(),
            credential_subject: subject(),
            expiration: 1_700_000_300,
            refresh_service: Some(RefreshService {
                id: "https://refresh.example/refresh".into(),
                service_type: "Iden3RefreshService2023".into(),
            }),
            rev_nonce: Some(42),
            display_method: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["credentialSchema"], json!("https://schemas/kyc.json"));
        assert_eq!(value["type"], json!("KYCAgeCredential"));
        assert_eq!(value["credentialSubject"]["birthday"], json!(19960425));
        assert_eq!(value["expiration"], json!(1_700_000_300));
        assert_eq!(value["revNonce"], json!(42));
        assert_eq!(value["refreshService"]["type"], json!("Iden3RefreshService2023"));
    }

    #[test]
    fn update_request_omits_absent_optionals() {
        let req = UpdateRequest {
            credential_schema: "s".into(),
            credential_type: "T".into(),
            credential_subject: subject(),
            expiration: 1,
            refresh_service: None,
            rev_nonce: None,
            display_method: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("refreshService"));
        assert!(!obj.contains_key("revNonce"));
        assert!(!obj.contains_key("displayMethod"));
        assert_eq!(obj.len(), 4);
    }

    #[test]
    fn envelope_unwraps_vc_key() {
        let env: CredentialEnvelope =
            serde_json::from_value(json!({"vc": {"id": "abc", "issuer": "did:iden3:x"}})).unwrap();
        assert_eq!(env.vc.id.as_deref(), Some("abc"));
    }
}
