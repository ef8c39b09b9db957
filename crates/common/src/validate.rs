//! Shared validity predicates for hashes and language tags.

use crate::PoolError;

/// `true` iff `s` is exactly 64 lowercase hex characters.
pub fn is_valid_hash(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Validates a 64-hex-lowercase hash, returning `PoolError::InvalidHash` if not.
pub fn require_hash(s: &str) -> Result<(), PoolError> {
    if is_valid_hash(s) {
        Ok(())
    } else {
        Err(PoolError::InvalidHash(s.to_string()))
    }
}

/// `true` iff `tag` is 3-256 chars drawn from ASCII letters, digits, and hyphen.
pub fn is_valid_language_tag(tag: &str) -> bool {
    let len = tag.chars().count();
    (3..=256).contains(&len)
        && tag
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Validates a language tag, returning `PoolError::InvalidLanguageTag` if not.
pub fn require_language_tag(tag: &str) -> Result<(), PoolError> {
    if is_valid_language_tag(tag) {
        Ok(())
    } else {
        Err(PoolError::InvalidLanguageTag(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_validity() {
        assert!(is_valid_hash(&"a".repeat(64)));
        assert!(!is_valid_hash(&"A".repeat(64)));
        assert!(!is_valid_hash("abc"));
        assert!(!is_valid_hash(&"g".repeat(64)));
    }

    #[test]
    fn language_tag_validity() {
        assert!(is_valid_language_tag("eng"));
        assert!(is_valid_language_tag("technical-french"));
        assert!(!is_valid_language_tag("en"));
        assert!(!is_valid_language_tag(&"e".repeat(257)));
        assert!(!is_valid_language_tag("en_US"));
    }
}
