//! Fingerprint digests.
//!
//! One pure function, [`hash_str`], backs both uses in this crate: hashing
//! serialized bitmaps from offscreen renders and hashing the canonical form of
//! a whole record. The digest is a convenience identity key. It is not
//! collision resistant and must never be used as a credential.

use serde_json::Value;

use crate::fingerprint::record::FingerprintRecord;

/// Top-level record fields that never take part in the identity hash.
const EXCLUDED_FIELDS: &[&str] = &["inconsistencies", "hash"];

/// 32-bit rolling string hash.
///
/// Iterates UTF-16 code units left to right with `h = (h << 5) - h + unit`,
/// wrapping at 32 bits and seeded at 0. The result is rendered as signed hex,
/// so negative values carry a leading `-`.
///
/// ```rust
/// use fingerprint_probe::fingerprint::hash_str;
///
/// assert_eq!(hash_str(""), "0");
/// assert_eq!(hash_str("a"), "61");
/// ```
pub fn hash_str(text: &str) -> String {
    let hash = text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    to_signed_hex(hash)
}

fn to_signed_hex(value: i32) -> String {
    if value < 0 {
        format!("-{:x}", (value as i64).unsigned_abs())
    } else {
        format!("{:x}", value)
    }
}

/// Canonical string form of the identity-relevant part of a record.
///
/// Drops analyzer output, any previous hash, window geometry and the live
/// clock, then renders the rest as JSON with sorted object keys.
pub fn canonical_form(record: &FingerprintRecord) -> String {
    // Serializing plain data structs into a Value cannot fail.
    let mut value = serde_json::to_value(record).unwrap_or(Value::Null);

    if let Value::Object(ref mut map) = value {
        for field in EXCLUDED_FIELDS {
            map.remove(*field);
        }
        if let Some(Value::Object(geometry)) = map.get_mut("geometry") {
            geometry.remove("window");
        }
        if let Some(Value::Object(temporal)) = map.get_mut("temporal") {
            temporal.remove("currentTime");
        }
    }

    value.to_string()
}

/// Identity digest of a record's non-volatile content.
pub fn hash_record(record: &FingerprintRecord) -> String {
    hash_str(&canonical_form(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::record::{Probe, RenderedFingerprint};
    use chrono::Utc;

    #[test]
    fn test_empty_string_hashes_to_zero() {
        assert_eq!(hash_str(""), "0");
    }

    #[test]
    fn test_known_values() {
        // "ab" = 97 * 31 + 98
        assert_eq!(hash_str("ab"), format!("{:x}", 97 * 31 + 98));
        assert_eq!(hash_str("hello"), "5e918d2");
    }

    #[test]
    fn test_negative_values_render_with_sign() {
        let digest = hash_str("The quick brown fox jumps over the lazy dog");
        assert!(digest.starts_with('-'));
        assert_eq!(digest, "-245322ad");
        let parsed = i64::from_str_radix(&digest, 16).unwrap();
        assert!(parsed >= i32::MIN as i64 && parsed <= i32::MAX as i64);
        assert_eq!(hash_str("The quick brown fox jumps over the lazy dog"), digest);
    }

    #[test]
    fn test_utf16_code_units() {
        // U+1F600 is a surrogate pair, so it contributes two code units.
        let emoji = hash_str("\u{1F600}");
        let pair = {
            let hi: i32 = 0xD83D;
            let lo: i32 = 0xDE00;
            hi.wrapping_shl(5).wrapping_sub(hi).wrapping_add(lo)
        };
        assert_eq!(emoji, to_signed_hex(pair));
    }

    #[test]
    fn test_volatile_fields_do_not_change_hash() {
        let mut record = FingerprintRecord::default();
        record.identity.user_agent = "UA".to_string();
        let baseline = hash_record(&record);

        record.geometry.window.inner_width = 1234;
        record.geometry.window.outer_height = 999;
        record.temporal.current_time = Some(Utc::now());
        record.inconsistencies.push("automation_detected".to_string());
        record.hash = Some("deadbeef".to_string());

        assert_eq!(hash_record(&record), baseline);
    }

    #[test]
    fn test_non_volatile_fields_change_hash() {
        let mut record = FingerprintRecord::default();
        let baseline = hash_record(&record);

        record.geometry.screen.width = 1920;
        let with_screen = hash_record(&record);
        assert_ne!(with_screen, baseline);

        record.canvas = Probe::Supported(RenderedFingerprint {
            hash: Some("abc".to_string()),
            error: None,
        });
        assert_ne!(hash_record(&record), with_screen);
    }

    #[test]
    fn test_canonical_form_excludes_volatile_sections() {
        let mut record = FingerprintRecord::default();
        record.inconsistencies.push("mobile_mismatch".to_string());
        let canonical = canonical_form(&record);
        assert!(!canonical.contains("inconsistencies"));
        assert!(!canonical.contains("innerWidth"));
        assert!(canonical.contains("\"screen\""));
    }
}
