//! Exact-match country name correction.
//!
//! The protest spreadsheet contains a handful of recurring typos (trailing
//! spaces, transposed letters, alternate spellings of the two Congos). A
//! [`NameCorrectionTable`] maps each known variant to the canonical name
//! used by the boundary dataset. Lookups are exact: no trimming, no case
//! folding, no partial matches.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

/// Embedded default corrections.
const BUILTIN_TOML: &str = include_str!("../corrections/builtin.toml");

#[derive(Debug, Deserialize)]
struct CorrectionFile {
    corrections: BTreeMap<String, String>,
}

/// Immutable mapping from variant names to canonical names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameCorrectionTable {
    entries: BTreeMap<String, String>,
}

impl NameCorrectionTable {
    /// Builds a table from raw `variant -> canonical` pairs.
    ///
    /// Chains (`A -> B`, `B -> C`) are collapsed to their final target so
    /// that normalizing twice gives the same result as normalizing once.
    /// Entries that map to themselves or take part in a cycle are dropped.
    #[must_use]
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        let mut resolved = BTreeMap::new();

        for key in entries.keys() {
            let mut seen = BTreeSet::from([key.as_str()]);
            let mut target = &entries[key];

            loop {
                if !seen.insert(target.as_str()) {
                    log::warn!("Dropping cyclic name correction for {key:?}");
                    break;
                }
                match entries.get(target) {
                    Some(next) => target = next,
                    None => {
                        resolved.insert(key.clone(), target.clone());
                        break;
                    }
                }
            }
        }

        Self { entries: resolved }
    }

    /// A table with no corrections; every name passes through.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The corrections known for the protest dataset, embedded at compile
    /// time.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. It is a compile-time
    /// constant, so a failure is a development error caught by tests.
    #[must_use]
    pub fn builtin() -> Self {
        let file: CorrectionFile = toml::de::from_str(BUILTIN_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse builtin name corrections: {e}"));
        Self::new(file.corrections)
    }

    /// Returns a new table with `overrides` layered on top of this one.
    /// An override replaces any existing entry with the same key.
    #[must_use]
    pub fn extend(&self, overrides: &BTreeMap<String, String>) -> Self {
        let mut merged = self.entries.clone();
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self::new(merged)
    }

    /// Returns the canonical name for `raw`, or `raw` itself when it is not
    /// a known variant.
    #[must_use]
    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.entries.get(raw).map_or(raw, String::as_str)
    }

    /// Number of corrections in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no corrections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(variant, canonical)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
