//! # refresh-engine: Credential Refresh Decision Engine
//!
//! Decides whether an expired iden3 credential may be reissued with fresh
//! attribute values, and drives the reissue when it may.
//!
//! ## Pipeline
//!
//! A refresh walks the stages of [`RefreshStage`] in order. Each stage
//! either advances or fails with a [`RefreshError`] that names it:
//!
//! 1. **Fetch** the credential from its issuer node.
//! 2. **Validate** the envelope, check **eligibility** (expired, valid
//!    subject id) and **ownership** (caller is the subject).
//! 3. **Resolve** the provider for the subject subtype and collect the
//!    proposed field values.
//! 4. **Confirm impact**: the update must change the claim's index
//!    commitment, otherwise reissuing would yield an equivalent credential.
//! 5. **Reissue** with the merged subject, the original revocation nonce,
//!    and a new expiration, then **refetch** the new credential.
//!
//! ## Seams
//!
//! Transport, document loading, attribute providers and claim parsing are
//! traits in [`traits`]. The engine owns no I/O of its own.

pub mod context;
pub mod eligibility;
pub mod error;
pub mod impact;
pub mod lookup;
pub mod orchestrator;
pub mod revocation;
pub mod stage;
pub mod traits;

pub use context::ContextAggregator;
pub use eligibility::{check_ownership, is_updatable};
pub use error::{
    EligibilityError, ImpactError, ProviderError, RefreshError, SerializationError, ServiceError,
    StructuralError,
};
pub use impact::{
    is_index_slot, same_value, ImpactVerdict, IndexImpactAnalyzer, INDEX_SLOT_A, INDEX_SLOT_B,
};
pub use lookup::{lookup_with_default, WILDCARD};
pub use orchestrator::{RefreshOrchestrator, RefreshRequest, DEFAULT_VALIDITY};
pub use revocation::extract_revocation_nonce;
pub use stage::RefreshStage;
pub use traits::{
    ClaimError, ClaimOracle, Clock, CredentialStore, DocumentLoader, MerklizedRootPosition,
    Provider, ProviderFactory, RemoteDocument, SlotLookupError, SystemClock,
};
