//! # refresh-issuer-client: Issuer Node and Document Clients
//!
//! HTTP implementations of the refresh engine's I/O seams:
//!
//! - [`IssuerClient`] implements [`refresh_engine::CredentialStore`] against
//!   the iden3 issuer-node `/v2` API, picking the node and basic-auth
//!   credentials per issuer DID.
//! - [`HttpDocumentLoader`] implements [`refresh_engine::DocumentLoader`]
//!   for JSON-LD contexts over HTTP(S) and an IPFS gateway.
//!
//! Reads are retried on transport errors with exponential backoff. Issuance
//! requests are sent once.

pub mod config;
pub mod error;
pub mod issuer;
pub mod loader;
pub(crate) mod retry;

pub use config::{ConfigError, IssuerConfig};
pub use error::IssuerError;
pub use issuer::IssuerClient;
pub use loader::{HttpDocumentLoader, DEFAULT_CACHE_CAPACITY};
