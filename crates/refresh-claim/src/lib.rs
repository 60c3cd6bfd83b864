//! # refresh-claim: iden3 Claim Inspection
//!
//! Implements [`refresh_engine::ClaimOracle`] for iden3 credentials:
//!
//! - [`core_claim`] reads the merklized root position from the flags byte
//!   of the hex-encoded `coreClaim` carried in the credential proof.
//! - [`serialization`] resolves a subject field to its claim slot from the
//!   `iden3_serialization` term of the subtype's JSON-LD context.

pub mod core_claim;
pub mod oracle;
pub mod serialization;

pub use core_claim::{merklized_position_from_hex, CLAIM_BYTES};
pub use oracle::Iden3ClaimOracle;
pub use serialization::{find_serialization_info, SerializationInfo};
