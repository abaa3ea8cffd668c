//! Storage key derivation for font filenames.
//!
//! Filenames come from user uploads and can be arbitrarily long or carry
//! characters that are unsafe as storage keys. [`derive_key`] maps them to
//! deterministic, bounded, filesystem-safe keys: short names pass through
//! sanitized, long names keep their tail plus a digest of the whole name so
//! distinct inputs stay distinct.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Prefix for icon set data keys. The registry key (`glyphbench.registry`)
/// lives outside this namespace, so no derived key can collide with it.
pub(crate) const DATA_PREFIX: &str = "glyphbench.set.";

/// Sanitized names at or below this length are used as-is.
const PASSTHROUGH_LIMIT: usize = 50;

/// How much of a long name's tail survives in the key.
const TAIL_LEN: usize = 40;

/// Length of the digest appended to long names.
const DIGEST_LEN: usize = 8;

/// Derives the storage key for a font filename.
///
/// Any leading path is dropped, characters outside `[A-Za-z0-9._-]` are
/// deleted, and the result is prefixed with [`DATA_PREFIX`]. Names longer
/// than 50 characters are shortened to their last 40 characters plus a
/// digest of the full sanitized name, keeping the key bounded while
/// separating long names that share a suffix.
pub fn derive_key(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    let sanitized: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    if sanitized.len() <= PASSTHROUGH_LIMIT {
        return format!("{DATA_PREFIX}{sanitized}");
    }

    // Sanitized input is ASCII without '?', '>', or '~', so the encoded
    // digest never contains '+' or '/', and 8 chars of a >50 char input
    // never reach padding.
    let encoded = STANDARD.encode(sanitized.as_bytes());
    let digest = &encoded[..DIGEST_LEN];
    let tail = &sanitized[sanitized.len() - TAIL_LEN..];
    format!("{DATA_PREFIX}{tail}-{digest}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_passes_through() {
        assert_eq!(derive_key("icons.ttf"), "glyphbench.set.icons.ttf");
    }

    #[test]
    fn unsafe_characters_are_deleted() {
        assert_eq!(derive_key("My Font!.ttf"), "glyphbench.set.MyFont.ttf");
        assert_eq!(derive_key("a b\tc%.woff"), "glyphbench.set.abc.woff");
    }

    #[test]
    fn leading_path_is_dropped() {
        assert_eq!(derive_key("fonts/icons.ttf"), "glyphbench.set.icons.ttf");
        assert_eq!(
            derive_key("C:\\Fonts\\icons.ttf"),
            "glyphbench.set.icons.ttf"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(derive_key("team icons.ttf"), derive_key("team icons.ttf"));
    }

    #[test]
    fn long_name_is_bounded() {
        let name = format!("{}.ttf", "a".repeat(200));
        let key = derive_key(&name);
        assert_eq!(key.len(), DATA_PREFIX.len() + TAIL_LEN + 1 + DIGEST_LEN);
        assert!(key.starts_with(DATA_PREFIX));
    }

    #[test]
    fn long_names_with_shared_tail_stay_distinct() {
        let tail = format!("{}.ttf", "x".repeat(60));
        let a = derive_key(&format!("alpha-{tail}"));
        let b = derive_key(&format!("omega-{tail}"));
        assert_ne!(a, b);
    }

    #[test]
    fn digest_is_key_safe() {
        let name = format!("{}_z.ttf", "z_".repeat(80));
        let key = derive_key(&name);
        assert!(key.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
        }));
    }

    #[test]
    fn fully_unsafe_name_still_produces_a_key() {
        assert_eq!(derive_key("???"), DATA_PREFIX);
    }
}
