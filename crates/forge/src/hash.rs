//! SHA-256 identity (spec §4.5): function hash over canonical code,
//! overlay hash over the canonical JSON of the four overlay fields.

use sha2::{Digest, Sha256};

use common::{OverlayFields, PoolError};

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// `function_hash = SHA-256(canonical_code)`, independent of metadata,
/// whitespace of the JSON envelope, or language overlay.
pub fn function_hash(canonical_code: &str) -> String {
    hex_digest(canonical_code.as_bytes())
}

/// `overlay_hash = SHA-256(canonical_json(overlay))`, independent of
/// which function the overlay belongs to.
pub fn overlay_hash(overlay: &OverlayFields) -> Result<String, PoolError> {
    let json = common::canonical::canonical_json(overlay)?;
    Ok(hex_digest(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_hash_is_64_hex_lowercase() {
        let h = function_hash("def _bb_v_0():\n    pass\n");
        assert_eq!(h.len(), 64);
        assert!(common::validate::is_valid_hash(&h));
    }

    #[test]
    fn overlay_hash_ignores_owning_function() {
        let o = OverlayFields {
            docstring: "Add".to_string(),
            name_mapping: Default::default(),
            alias_mapping: Default::default(),
            comment: "formal".to_string(),
        };
        assert_eq!(overlay_hash(&o).unwrap(), overlay_hash(&o.clone()).unwrap());
    }

    #[test]
    fn function_hash_is_deterministic() {
        let code = "def _bb_v_0(_bb_v_1):\n    return _bb_v_1\n";
        assert_eq!(function_hash(code), function_hash(code));
    }
}
