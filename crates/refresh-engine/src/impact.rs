//! # Index Impact Analysis
//!
//! Decides whether a proposed set of field changes is consequential enough
//! to justify issuing a new credential.
//!
//! Only changes that land in the claim's index commitment are
//! cryptographically meaningful. Changes confined to value slots are
//! rejected, and a subject committed as a single value never changes the
//! index at all.
//!
//! ## Decision table
//!
//! | Root position | Verdict |
//! |---------------|---------|
//! | `Index` | `Updated` for any proposal, including an empty one |
//! | `Value` | `NotUpdated`, regardless of the proposal |
//! | `None` | per field, see [`IndexImpactAnalyzer::decide_fields`] |

use std::sync::Arc;

use serde_json::Value;

use refresh_vc::{Subject, W3CCredential};

use crate::context::ContextAggregator;
use crate::error::ImpactError;
use crate::traits::{ClaimOracle, MerklizedRootPosition, SlotLookupError};

/// First index slot of a claim (iden3 claim layout v1).
pub const INDEX_SLOT_A: u8 = 2;
/// Second index slot of a claim (iden3 claim layout v1).
pub const INDEX_SLOT_B: u8 = 3;

/// Subject keys never inspected for impact.
const RESERVED_KEYS: [&str; 2] = ["id", "type"];

/// Outcome of an impact analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactVerdict {
    Updated,
    NotUpdated,
}

/// Whether a slot index belongs to the index commitment.
pub fn is_index_slot(slot: u8) -> bool {
    slot == INDEX_SLOT_A || slot == INDEX_SLOT_B
}

/// JSON equality with numbers compared by value, so `5` and `5.0` match.
/// Integers are compared exactly, anything else as `f64`.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            x.as_f64() == y.as_f64()
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

/// Index-impact analyzer over a claim oracle and a context aggregator.
#[derive(Clone)]
pub struct IndexImpactAnalyzer {
    oracle: Arc<dyn ClaimOracle>,
    contexts: ContextAggregator,
}

impl std::fmt::Debug for IndexImpactAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexImpactAnalyzer").finish_non_exhaustive()
    }
}

impl IndexImpactAnalyzer {
    pub fn new(oracle: Arc<dyn ClaimOracle>, contexts: ContextAggregator) -> Self {
        Self { oracle, contexts }
    }

    /// Classify the credential and decide.
    ///
    /// Context documents are only loaded when the root position is `None`.
    pub async fn decide(
        &self,
        credential: &W3CCredential,
        old_subject: &Subject,
        new_values: &Subject,
    ) -> Result<ImpactVerdict, ImpactError> {
        let position = self.oracle.merklized_position(credential)?;
        tracing::debug!(%position, "merklized root position");

        match position {
            MerklizedRootPosition::Index => Ok(ImpactVerdict::Updated),
            MerklizedRootPosition::Value => Ok(ImpactVerdict::NotUpdated),
            MerklizedRootPosition::None => {
                let context = self.contexts.aggregate(&credential.context).await;
                self.decide_fields(position, old_subject, new_values, &context)
            }
        }
    }

    /// Decide from a known root position and an aggregated context.
    ///
    /// For `None`, old-subject fields are visited in document order,
    /// skipping `id` and `type`:
    ///
    /// 1. no string `type` in the old subject: skip the field (warn);
    /// 2. slot lookup reports the field as unconstrained: `Updated`;
    /// 3. any other lookup error: propagate;
    /// 4. field absent from `new_values`: skip (warn);
    /// 5. index slot and value changed: `Updated`.
    ///
    /// The first field satisfying 2 or 5 wins.
    pub fn decide_fields(
        &self,
        position: MerklizedRootPosition,
        old_subject: &Subject,
        new_values: &Subject,
        context: &Value,
    ) -> Result<ImpactVerdict, ImpactError> {
        match position {
            MerklizedRootPosition::Index => return Ok(ImpactVerdict::Updated),
            MerklizedRootPosition::Value => return Ok(ImpactVerdict::NotUpdated),
            MerklizedRootPosition::None => {}
        }

        for (field, old_value) in old_subject {
            if RESERVED_KEYS.contains(&field.as_str()) {
                continue;
            }

            let subtype = match old_subject.get("type") {
                Some(Value::String(subtype)) => subtype,
                Some(_) => {
                    tracing::warn!(field = %field, "subject type is not a string, skipping field");
                    continue;
                }
                None => {
                    tracing::warn!(field = %field, "subject type is missing, skipping field");
                    continue;
                }
            };

            let slot = match self.oracle.field_slot_index(field, subtype, context) {
                Ok(slot) => slot,
                Err(SlotLookupError::NotInSerializationInfo { .. }) => {
                    tracing::debug!(field = %field, "field not constrained by serialization info");
                    return Ok(ImpactVerdict::Updated);
                }
                Err(e) => return Err(e.into()),
            };

            let Some(new_value) = new_values.get(field) else {
                tracing::warn!(field = %field, "field not found in proposed values");
                continue;
            };

            if is_index_slot(slot) && !same_value(old_value, new_value) {
                tracing::debug!(field = %field, slot, "index slot value changed");
                return Ok(ImpactVerdict::Updated);
            }
        }

        Ok(ImpactVerdict::NotUpdated)
    }
}
