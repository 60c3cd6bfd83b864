//! Pipeline stages of a credential refresh.

use std::fmt;

/// The states a refresh passes through, in order. There is no branching
/// back: a failure at any transition aborts the refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefreshStage {
    /// Credential fetched from the issuer node.
    Fetched,
    /// Required envelope fields are present.
    StructurallyValid,
    /// Credential is expired and has a valid subject id.
    Eligible,
    /// Caller owns the credential.
    Owned,
    /// Subject subtype extracted.
    TypeResolved,
    /// Update provider found for the subtype.
    ProviderResolved,
    /// Provider returned proposed field values.
    FieldsUpdated,
    /// Proposed values change the index commitment.
    ImpactConfirmed,
    /// Revocation nonce extracted.
    NonceExtracted,
    /// Replacement credential issued.
    Reissued,
    /// Replacement credential fetched back.
    Refetched,
}

impl RefreshStage {
    /// Stable kebab-case name, used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::StructurallyValid => "structurally-valid",
            Self::Eligible => "eligible",
            Self::Owned => "owned",
            Self::TypeResolved => "type-resolved",
            Self::ProviderResolved => "provider-resolved",
            Self::FieldsUpdated => "fields-updated",
            Self::ImpactConfirmed => "impact-confirmed",
            Self::NonceExtracted => "nonce-extracted",
            Self::Reissued => "reissued",
            Self::Refetched => "refetched",
        }
    }
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
