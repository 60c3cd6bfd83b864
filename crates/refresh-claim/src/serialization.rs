//! # Serialization Info
//!
//! Non-merklized iden3 schemas map subject fields onto claim slots through
//! an `iden3_serialization` term in the type's scoped JSON-LD context:
//!
//! ```json
//! "KYCAgeCredential": {
//!   "@id": "...",
//!   "@context": {
//!     "iden3_serialization": "iden3:v1:slotIndexA=birthday&slotValueA=documentType"
//!   }
//! }
//! ```

use serde_json::Value;

use refresh_engine::SlotLookupError;

const PREFIX: &str = "iden3:v1:";
const SERIALIZATION_TERM: &str = "iden3_serialization";

/// Parsed `iden3:v1` serialization info: the field stored in each of the
/// four data slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializationInfo {
    pub index_a: Option<String>,
    pub index_b: Option<String>,
    pub value_a: Option<String>,
    pub value_b: Option<String>,
}

impl SerializationInfo {
    /// Parse `iden3:v1:slotIndexA=..&slotIndexB=..&slotValueA=..&slotValueB=..`.
    ///
    /// Every key is optional; an empty body names no fields.
    pub fn parse(raw: &str) -> Result<Self, SlotLookupError> {
        let body = raw.strip_prefix(PREFIX).ok_or_else(|| {
            SlotLookupError::InvalidSerializationInfo(format!("unsupported format: {raw}"))
        })?;

        let mut info = Self::default();
        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (key, field) = pair.split_once('=').ok_or_else(|| {
                SlotLookupError::InvalidSerializationInfo(format!("expected key=value, got `{pair}`"))
            })?;
            if field.is_empty() {
                return Err(SlotLookupError::InvalidSerializationInfo(format!(
                    "empty field name for `{key}`"
                )));
            }

            let slot = match key {
                "slotIndexA" => &mut info.index_a,
                "slotIndexB" => &mut info.index_b,
                "slotValueA" => &mut info.value_a,
                "slotValueB" => &mut info.value_b,
                other => {
                    return Err(SlotLookupError::InvalidSerializationInfo(format!(
                        "unknown slot `{other}`"
                    )))
                }
            };
            if slot.is_some() {
                return Err(SlotLookupError::InvalidSerializationInfo(format!(
                    "slot `{key}` assigned twice"
                )));
            }
            *slot = Some(field.to_string());
        }
        Ok(info)
    }

    /// Slot index of `field`: 2 and 3 for index slots, 6 and 7 for value
    /// slots.
    pub fn slot_of(&self, field: &str) -> Result<u8, SlotLookupError> {
        let named = |slot: &Option<String>| slot.as_deref() == Some(field);
        if named(&self.index_a) {
            Ok(2)
        } else if named(&self.index_b) {
            Ok(3)
        } else if named(&self.value_a) {
            Ok(6)
        } else if named(&self.value_b) {
            Ok(7)
        } else {
            Err(SlotLookupError::NotInSerializationInfo {
                field: field.to_string(),
            })
        }
    }
}

/// Find the serialization info for `subtype` in an aggregated
/// `{"@context": [...]}` document.
///
/// The first context entry that defines `subtype` wins.
pub fn find_serialization_info(
    context: &Value,
    subtype: &str,
) -> Result<SerializationInfo, SlotLookupError> {
    let entries: &[Value] = match context.get("@context") {
        Some(Value::Array(entries)) => entries,
        Some(single) => std::slice::from_ref(single),
        None => &[],
    };

    let definition = entries
        .iter()
        .filter_map(Value::as_object)
        .find_map(|entry| entry.get(subtype))
        .ok_or_else(|| SlotLookupError::TypeNotFound {
            subtype: subtype.to_string(),
        })?;

    let raw = definition
        .get("@context")
        .and_then(|scoped| scoped.get(SERIALIZATION_TERM))
        .ok_or_else(|| SlotLookupError::MissingSerializationInfo {
            subtype: subtype.to_string(),
        })?;

    let raw = raw.as_str().ok_or_else(|| {
        SlotLookupError::InvalidSerializationInfo(format!("{SERIALIZATION_TERM} is not a string"))
    })?;

    SerializationInfo::parse(raw)
}
