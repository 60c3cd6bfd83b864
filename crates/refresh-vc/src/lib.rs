//! # refresh-vc: Verifiable Credential Data Model
//!
//! Typed envelope for the credentials the refresh service reads from and
//! writes to issuer nodes:
//!
//! - **Credential structure** ([`W3CCredential`]) following the W3C VC Data
//!   Model with the iden3 extensions (`credentialStatus`, `refreshService`,
//!   `displayMethod`, `coreClaim` proofs).
//! - **Credential subject** ([`Subject`]) as an insertion-ordered map of
//!   JSON values. Subject fields are schema-defined at runtime, so no fixed
//!   record type is imposed.
//! - **Wire shapes** ([`UpdateRequest`], [`CredentialEnvelope`],
//!   [`CreatedCredential`]) for the issuer node API.
//!
//! Envelope fields deserialize as `Option` so that callers can report which
//! required field is missing rather than rejecting the whole document in the
//! decoder.

pub mod credential;
pub mod request;

pub use credential::{CredentialSchema, DisplayMethod, RefreshService, Subject, W3CCredential};
pub use request::{CreatedCredential, CredentialEnvelope, UpdateRequest};
