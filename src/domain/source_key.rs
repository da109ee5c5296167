//! Source Key Derivation
//!
//! Maps host items to stable leaf keys. The key is re-derived from the
//! item's title on every scan, so identity survives host re-renders.

use std::collections::HashSet;

use super::ids::LeafKey;

/// Number of hex characters of the title hash kept in a key
const KEY_HASH_LEN: usize = 16;

/// Assigns leaf keys to host items
pub trait KeyResolver {
    /// Key for the item at `index` of the current scan. `taken` holds the
    /// keys already handed out during the same scan.
    fn resolve(&self, title: &str, index: usize, taken: &HashSet<LeafKey>) -> LeafKey;
}

/// Default resolver: blake3 of the title, suffixed by the scan position
/// when two items share a title.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleKeyResolver;

impl TitleKeyResolver {
    /// Format: `source_<first 16 hex chars of blake3(title)>`
    pub fn base_key(title: &str) -> LeafKey {
        let hash = blake3::hash(title.as_bytes());
        let hex = hash.to_hex();
        LeafKey::new(format!("source_{}", &hex.as_str()[..KEY_HASH_LEN]))
    }
}

impl KeyResolver for TitleKeyResolver {
    fn resolve(&self, title: &str, index: usize, taken: &HashSet<LeafKey>) -> LeafKey {
        let base = Self::base_key(title);
        if taken.contains(&base) {
            LeafKey::new(format!("{}_{}", base, index))
        } else {
            base
        }
    }
}

/// Resolve the keys of one full scan, in host order
pub fn resolve_scan<'a, R>(resolver: &R, titles: impl IntoIterator<Item = &'a str>) -> Vec<LeafKey>
where
    R: KeyResolver + ?Sized,
{
    let mut taken = HashSet::new();
    let mut keys = Vec::new();
    for (index, title) in titles.into_iter().enumerate() {
        let key = resolver.resolve(title, index, &taken);
        taken.insert(key.clone());
        keys.push(key);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_key_is_deterministic() {
        let a = TitleKeyResolver::base_key("Quarterly report.pdf");
        let b = TitleKeyResolver::base_key("Quarterly report.pdf");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("source_"));
        assert_eq!(a.as_str().len(), "source_".len() + KEY_HASH_LEN);
    }

    #[test]
    fn test_duplicate_titles_get_positional_suffix() {
        let keys = resolve_scan(&TitleKeyResolver, ["Notes", "Paper", "Notes"]);
        assert_eq!(keys.len(), 3);
        assert_ne!(keys[0], keys[2]);
        assert_eq!(keys[2].as_str(), format!("{}_2", keys[0]));
    }

    #[test]
    fn test_keys_survive_rescan() {
        let first = resolve_scan(&TitleKeyResolver, ["A", "B"]);
        let second = resolve_scan(&TitleKeyResolver, ["A", "B"]);
        assert_eq!(first, second);
    }
}
