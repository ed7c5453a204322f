//! The configurable part of the codec: which elements are known, and how
//! much valence each one is allowed to spend. Encoding and decoding are
//! both pure functions of `(input, AlphabetSnapshot)` — no global state
//! is threaded through the algorithms themselves; [`set_alphabet`] and
//! friends exist only as the process-wide convenience wrapper described
//! for callers who don't want to carry a snapshot around by hand.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};

use super::error::AlphabetError;
use crate::tables::{default_valence, is_organic_subset, upper_first, ORGANIC_SUBSET};

const BOND_PREFIXES: [&str; 3] = ["", "=", "#"];

/// An immutable view of the element valence table used by a single
/// `encode`/`decode` call. Cheap to clone (`Arc`-backed in the global
/// convenience wrapper) and safe to share across threads: nothing about
/// encoding or decoding mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlphabetSnapshot {
    overrides: BTreeMap<String, i32>,
}

impl AlphabetSnapshot {
    /// The valence cap for `element`, honoring any override before
    /// falling back to the built-in table.
    pub fn valence(&self, element: &str, restricted_nitrogen: bool) -> i32 {
        self.overrides
            .get(element)
            .copied()
            .unwrap_or_else(|| default_valence(element, restricted_nitrogen))
    }

    /// Whether `element` should get a bare `[bE]` SELFIES symbol rather
    /// than an explicit-valence `...expl` suffixed one. Elements added
    /// via `set_alphabet` always get the explicit form, since their
    /// valence isn't part of the built-in organic subset.
    pub fn is_organic_subset(&self, element: &str) -> bool {
        is_organic_subset(element) && !self.overrides.contains_key(element)
    }

    /// The SELFIES symbol text for `element` (without brackets or bond
    /// prefix): the bare element name for the organic subset, or
    /// `{element}expl` for anything configured with an explicit valence.
    pub fn symbol_text(&self, element: &str) -> String {
        if self.is_organic_subset(element) {
            element.to_string()
        } else {
            format!("{element}expl")
        }
    }

    /// Recovers the element name from a SELFIES symbol's text, stripping
    /// the `expl` suffix if present.
    pub fn element_from_symbol_text(text: &str) -> &str {
        text.strip_suffix("expl").unwrap_or(text)
    }

    /// The full set of element->valence-cap entries visible right now:
    /// every organic-subset default plus any configured override.
    /// Matches `get_atom_dict`'s contract (spec.md §7/§9).
    pub fn atom_dict(&self) -> BTreeMap<String, i32> {
        let mut dict: BTreeMap<String, i32> = ORGANIC_SUBSET
            .iter()
            .map(|&e| (e.to_string(), default_valence(e, true)))
            .collect();
        dict.extend(self.overrides.iter().map(|(k, v)| (k.clone(), *v)));
        dict
    }

    /// Every bracketed SELFIES symbol derivable from the current
    /// element set: one per (bond prefix, element) pair, plus the fixed
    /// meta-symbols (`[epsilon]`, branch/ring markers).
    pub fn alphabet(&self) -> Vec<String> {
        let mut symbols = Vec::new();
        for element in self.atom_dict().keys() {
            let text = self.symbol_text(element);
            for prefix in BOND_PREFIXES {
                symbols.push(format!("[{prefix}{text}]"));
            }
        }
        symbols.push("[epsilon]".to_string());
        for l in 1..=3u8 {
            for x in 1..=3u8 {
                symbols.push(format!("[Branch{l}_{x}]"));
            }
            symbols.push(format!("[Ring{l}]"));
            for prefix in ["=", "#"] {
                symbols.push(format!("[{prefix}ExplRing{l}]"));
            }
        }
        symbols.sort();
        symbols
    }

    /// Merges `mapping` (element symbol -> positive valence cap) onto
    /// this snapshot, returning the updated one. Unknown keys are added;
    /// existing keys are overridden; absent keys retain their prior
    /// value. Element keys may be given bare (`"Li"`) or bracketed
    /// (`"[Li]"`).
    pub fn merge(&self, mapping: &BTreeMap<String, i32>) -> Result<Self, AlphabetError> {
        let mut overrides = self.overrides.clone();
        for (key, &valence) in mapping {
            let element = key.strip_prefix('[').unwrap_or(key);
            let element = element.strip_suffix(']').unwrap_or(element);
            if element.is_empty() || !element.chars().next().unwrap().is_ascii_alphabetic() {
                return Err(AlphabetError::AlphabetConflict(format!(
                    "not a valid element key: {key:?}"
                )));
            }
            if valence <= 0 {
                return Err(AlphabetError::AlphabetConflict(format!(
                    "non-positive valence {valence} for {key:?}"
                )));
            }
            overrides.insert(upper_first(element), valence);
        }
        Ok(Self { overrides })
    }
}

static GLOBAL: OnceLock<RwLock<Arc<AlphabetSnapshot>>> = OnceLock::new();

fn global() -> &'static RwLock<Arc<AlphabetSnapshot>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(AlphabetSnapshot::default())))
}

/// The process-wide alphabet snapshot currently in effect.
pub fn get_alphabet_snapshot() -> Arc<AlphabetSnapshot> {
    Arc::clone(&global().read().unwrap_or_else(|e| e.into_inner()))
}

/// Every bracketed SELFIES symbol derivable from the process-wide
/// alphabet.
pub fn get_alphabet() -> Vec<String> {
    get_alphabet_snapshot().alphabet()
}

/// The process-wide element -> valence-cap table.
pub fn get_atom_dict() -> BTreeMap<String, i32> {
    get_alphabet_snapshot().atom_dict()
}

/// Updates the process-wide alphabet. `None` reverts to the built-in
/// defaults; `Some(mapping)` merges new or overridden entries onto
/// whatever is currently configured.
pub fn set_alphabet(mapping: Option<BTreeMap<String, i32>>) -> Result<(), AlphabetError> {
    let mut guard = global().write().unwrap_or_else(|e| e.into_inner());
    *guard = Arc::new(match mapping {
        None => AlphabetSnapshot::default(),
        Some(m) => guard.merge(&m)?,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_valence_matches_table() {
        let snap = AlphabetSnapshot::default();
        assert_eq!(snap.valence("C", true), 4);
        assert_eq!(snap.valence("N", true), 3);
    }

    #[test]
    fn organic_subset_gets_bare_symbol() {
        let snap = AlphabetSnapshot::default();
        assert_eq!(snap.symbol_text("C"), "C");
        assert_eq!(snap.symbol_text("Li"), "Liexpl");
    }

    #[test]
    fn merge_adds_and_overrides() {
        let snap = AlphabetSnapshot::default();
        let mut mapping = BTreeMap::new();
        mapping.insert("[Li]".to_string(), 1);
        let merged = snap.merge(&mapping).unwrap();
        assert_eq!(merged.valence("Li", true), 1);
        assert!(!merged.is_organic_subset("Li"));

        let mut override_c = BTreeMap::new();
        override_c.insert("C".to_string(), 2);
        let merged2 = merged.merge(&override_c).unwrap();
        assert_eq!(merged2.valence("Li", true), 1); // retained
        assert_eq!(merged2.valence("C", true), 2); // overridden
    }

    #[test]
    fn merge_rejects_non_positive_valence() {
        let snap = AlphabetSnapshot::default();
        let mut mapping = BTreeMap::new();
        mapping.insert("Li".to_string(), 0);
        assert!(snap.merge(&mapping).is_err());
    }

    #[test]
    fn element_from_symbol_text_strips_expl() {
        assert_eq!(AlphabetSnapshot::element_from_symbol_text("Liexpl"), "Li");
        assert_eq!(AlphabetSnapshot::element_from_symbol_text("C"), "C");
    }

    #[test]
    fn set_alphabet_none_reverts_defaults() {
        let mut mapping = BTreeMap::new();
        mapping.insert("Xx".to_string(), 7);
        set_alphabet(Some(mapping)).unwrap();
        assert_eq!(get_atom_dict().get("Xx"), Some(&7));

        // re-applying the current snapshot's own dictionary is a no-op
        // (spec.md §8's idempotence property).
        let dict = get_atom_dict();
        set_alphabet(Some(dict.clone())).unwrap();
        assert_eq!(get_atom_dict(), dict);

        set_alphabet(None).unwrap();
        assert_eq!(get_atom_dict().get("Xx"), None);
    }
}
