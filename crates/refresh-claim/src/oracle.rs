//! [`ClaimOracle`] backed by the credential's own proofs and JSON-LD
//! contexts.

use serde_json::Value;

use refresh_engine::{ClaimError, ClaimOracle, MerklizedRootPosition, SlotLookupError};
use refresh_vc::W3CCredential;

use crate::core_claim::merklized_position_from_hex;
use crate::serialization::find_serialization_info;

/// Reads iden3 claims without network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iden3ClaimOracle;

impl Iden3ClaimOracle {
    pub fn new() -> Self {
        Self
    }
}

impl ClaimOracle for Iden3ClaimOracle {
    /// Uses the first proof entry that carries a `coreClaim`. Every proof of
    /// an iden3 credential encodes the same claim.
    fn merklized_position(
        &self,
        credential: &W3CCredential,
    ) -> Result<MerklizedRootPosition, ClaimError> {
        let core_claim = credential
            .proofs()
            .find_map(|proof| proof.get("coreClaim"))
            .ok_or(ClaimError::MissingCoreClaim)?;

        let Value::String(core_claim) = core_claim else {
            return Err(ClaimError::InvalidCoreClaim("coreClaim is not a string".into()));
        };

        merklized_position_from_hex(core_claim)
    }

    fn field_slot_index(
        &self,
        field: &str,
        subtype: &str,
        context: &Value,
    ) -> Result<u8, SlotLookupError> {
        let slot = find_serialization_info(context, subtype)?.slot_of(field)?;
        tracing::trace!(field, subtype, slot, "resolved field slot");
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_claim::CLAIM_BYTES;
    use serde_json::json;

    fn credential(proof: Value) -> W3CCredential {
        serde_json::from_value(json!({"id": "urn:uuid:1", "proof": proof})).unwrap()
    }

    fn core_claim(flags: u8) -> String {
        let mut bytes = vec![0u8; CLAIM_BYTES];
        bytes[16] = flags;
        hex::encode(bytes)
    }

    #[test]
    fn reads_position_from_single_proof() {
        let vc = credential(json!({"type": "BJJSignature2021", "coreClaim": core_claim(0x20)}));
        assert_eq!(
            Iden3ClaimOracle.merklized_position(&vc).unwrap(),
            MerklizedRootPosition::Index
        );
    }

    #[test]
    fn skips_proofs_without_core_claim() {
        let vc = credential(json!([
            {"type": "Ed25519Signature2020"},
            {"type": "Iden3SparseMerkleTreeProof", "coreClaim": core_claim(0x40)}
        ]));
        assert_eq!(
            Iden3ClaimOracle.merklized_position(&vc).unwrap(),
            MerklizedRootPosition::Value
        );
    }

    #[test]
    fn missing_proof_is_missing_core_claim() {
        let vc: W3CCredential = serde_json::from_value(json!({"id": "urn:uuid:1"})).unwrap();
        assert_eq!(
            Iden3ClaimOracle.merklized_position(&vc),
            Err(ClaimError::MissingCoreClaim)
        );
        let vc = credential(json!([{"type": "Ed25519Signature2020"}]));
        assert_eq!(
            Iden3ClaimOracle.merklized_position(&vc),
            Err(ClaimError::MissingCoreClaim)
        );
    }

    #[test]
    fn slot_index_from_context() {
        let ctx = json!({"@context": [{
            "KYCAgeCredential": {"@context": {
                "iden3_serialization": "iden3:v1:slotIndexA=birthday&slotValueB=documentType"
            }}
        }]});
        let oracle = Iden3ClaimOracle::new();
        assert_eq!(oracle.field_slot_index("birthday", "KYCAgeCredential", &ctx), Ok(2));
        assert_eq!(oracle.field_slot_index("documentType", "KYCAgeCredential", &ctx), Ok(7));
        assert!(matches!(
            oracle.field_slot_index("nationality", "KYCAgeCredential", &ctx),
            Err(SlotLookupError::NotInSerializationInfo { .. })
        ));
    }
}
