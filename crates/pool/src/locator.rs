//! Spec §6.2: `<function_hash>[@<language_tag>[@<overlay_hash>]]`.

use common::{validate, PoolError};

/// A parsed locator: always a function hash, optionally a language tag,
/// optionally (only alongside a language tag) an overlay hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub function_hash: String,
    pub language_tag: Option<String>,
    pub overlay_hash: Option<String>,
}

/// Parses the `HASH[@LANG[@MHASH]]` surface syntax (spec §6.2, Scenario E).
///
/// Structural shape is checked first (too many/zero-length segments is
/// `InvalidLocator`), then each present segment is validated with its own
/// error kind, so `"nothex@eng"` reports `InvalidHash` while a syntactically
/// fine two-segment locator with a bad tag reports `InvalidLanguageTag`.
pub fn parse_locator(s: &str) -> Result<Locator, PoolError> {
    let segments: Vec<&str> = s.split('@').collect();
    if segments.iter().any(|seg| seg.is_empty()) {
        return Err(PoolError::InvalidLocator(s.to_string()));
    }

    match segments.as_slice() {
        [hash] => {
            validate::require_hash(hash)?;
            Ok(Locator {
                function_hash: hash.to_string(),
                language_tag: None,
                overlay_hash: None,
            })
        }
        [hash, lang] => {
            validate::require_hash(hash)?;
            validate::require_language_tag(lang)?;
            Ok(Locator {
                function_hash: hash.to_string(),
                language_tag: Some(lang.to_string()),
                overlay_hash: None,
            })
        }
        [hash, lang, overlay] => {
            validate::require_hash(hash)?;
            validate::require_language_tag(lang)?;
            validate::require_hash(overlay)?;
            Ok(Locator {
                function_hash: hash.to_string(),
                language_tag: Some(lang.to_string()),
                overlay_hash: Some(overlay.to_string()),
            })
        }
        _ => Err(PoolError::InvalidLocator(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> String {
        format!("{byte:02x}").repeat(32)
    }

    #[test]
    fn parses_function_plus_language() {
        let h = hash(0xab);
        let loc = parse_locator(&format!("{h}@eng")).unwrap();
        assert_eq!(loc.function_hash, h);
        assert_eq!(loc.language_tag.as_deref(), Some("eng"));
        assert_eq!(loc.overlay_hash, None);
    }

    #[test]
    fn rejects_short_language_tag() {
        let h = hash(0xab);
        let err = parse_locator(&format!("{h}@en")).unwrap_err();
        assert!(matches!(err, PoolError::InvalidLanguageTag(_)));
    }

    #[test]
    fn rejects_malformed_hash() {
        let err = parse_locator("nothex@eng").unwrap_err();
        assert!(matches!(err, PoolError::InvalidHash(_)));
    }

    #[test]
    fn parses_fully_specified_triple() {
        let h = hash(0xab);
        let m = hash(0xcd);
        let loc = parse_locator(&format!("{h}@eng@{m}")).unwrap();
        assert_eq!(loc.function_hash, h);
        assert_eq!(loc.language_tag.as_deref(), Some("eng"));
        assert_eq!(loc.overlay_hash.as_deref(), Some(m.as_str()));
    }

    #[test]
    fn rejects_too_many_segments() {
        let h = hash(0xab);
        let err = parse_locator(&format!("{h}@eng@{h}@extra")).unwrap_err();
        assert!(matches!(err, PoolError::InvalidLocator(_)));
    }

    #[test]
    fn rejects_empty_segment() {
        let h = hash(0xab);
        let err = parse_locator(&format!("{h}@")).unwrap_err();
        assert!(matches!(err, PoolError::InvalidLocator(_)));
    }
}
