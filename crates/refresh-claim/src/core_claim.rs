//! # Core Claim Flags
//!
//! An iden3 claim is eight 32-byte slots: four index slots followed by four
//! value slots. The first index slot carries the schema hash in bytes
//! `0..16` and the claim flags in byte 16.
//!
//! Bits 5 to 7 of the flags byte record where the merklized root of the
//! subject is stored:
//!
//! | Bits 5..7 | Position |
//! |-----------|----------|
//! | `000` | not merklized |
//! | `001` | index slot |
//! | `010` | value slot |

use refresh_engine::{ClaimError, MerklizedRootPosition};

/// Size of one claim slot in bytes.
pub const SLOT_BYTES: usize = 32;

/// Size of an encoded claim in bytes.
pub const CLAIM_BYTES: usize = 8 * SLOT_BYTES;

const FLAGS_OFFSET: usize = 16;
const MERKLIZED_MASK: u8 = 0b1110_0000;
const MERKLIZED_INDEX: u8 = 0b0010_0000;
const MERKLIZED_VALUE: u8 = 0b0100_0000;

/// Decode a hex `coreClaim` and read its merklized root position.
pub fn merklized_position_from_hex(core_claim: &str) -> Result<MerklizedRootPosition, ClaimError> {
    let bytes = hex::decode(core_claim.trim_start_matches("0x"))
        .map_err(|e| ClaimError::InvalidCoreClaim(format!("not hex: {e}")))?;

    if bytes.len() != CLAIM_BYTES {
        return Err(ClaimError::InvalidCoreClaim(format!(
            "expected {CLAIM_BYTES} bytes, got {}",
            bytes.len()
        )));
    }

    merklized_position_from_flags(bytes[FLAGS_OFFSET])
}

/// Read the merklized root position from a claim flags byte.
pub fn merklized_position_from_flags(flags: u8) -> Result<MerklizedRootPosition, ClaimError> {
    match flags & MERKLIZED_MASK {
        0 => Ok(MerklizedRootPosition::None),
        MERKLIZED_INDEX => Ok(MerklizedRootPosition::Index),
        MERKLIZED_VALUE => Ok(MerklizedRootPosition::Value),
        other => Err(ClaimError::InvalidCoreClaim(format!(
            "invalid merklized flag {:#04x}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn claim_with_flags(flags: u8) -> String {
        let mut bytes = [0u8; CLAIM_BYTES];
        bytes[FLAGS_OFFSET] = flags;
        hex::encode(bytes)
    }

    #[test]
    fn flag_bits_map_to_positions() {
        assert_eq!(
            merklized_position_from_hex(&claim_with_flags(0x00)).unwrap(),
            MerklizedRootPosition::None
        );
        assert_eq!(
            merklized_position_from_hex(&claim_with_flags(0x20)).unwrap(),
            MerklizedRootPosition::Index
        );
        assert_eq!(
            merklized_position_from_hex(&claim_with_flags(0x40)).unwrap(),
            MerklizedRootPosition::Value
        );
    }

    #[test]
    fn lower_flag_bits_are_ignored() {
        // subject-position and expiration flags share the byte
        assert_eq!(
            merklized_position_from_hex(&claim_with_flags(0x2a)).unwrap(),
            MerklizedRootPosition::Index
        );
    }

    #[test]
    fn both_bits_set_is_invalid() {
        assert!(matches!(
            merklized_position_from_hex(&claim_with_flags(0x60)),
            Err(ClaimError::InvalidCoreClaim(_))
        ));
    }

    #[test]
    fn wrong_length_is_invalid() {
        let err = merklized_position_from_hex("00ff").unwrap_err();
        assert!(matches!(err, ClaimError::InvalidCoreClaim(msg) if msg.contains("256")));
    }

    #[test]
    fn non_hex_is_invalid() {
        assert!(matches!(
            merklized_position_from_hex("zz"),
            Err(ClaimError::InvalidCoreClaim(_))
        ));
    }

    proptest! {
        #[test]
        fn only_top_three_bits_decide(flags in any::<u8>()) {
            let result = merklized_position_from_flags(flags);
            match flags >> 5 {
                0b000 => prop_assert_eq!(result, Ok(MerklizedRootPosition::None)),
                0b001 => prop_assert_eq!(result, Ok(MerklizedRootPosition::Index)),
                0b010 => prop_assert_eq!(result, Ok(MerklizedRootPosition::Value)),
                _ => prop_assert!(result.is_err()),
            }
        }
    }
}
