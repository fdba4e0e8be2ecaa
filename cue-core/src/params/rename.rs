//! Raw-to-canonical field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::ParamMap;

/// Maps raw parameter keys (e.g. `f0`) to the names templates read
/// (e.g. `line1`). Built once from configuration and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenameTable(BTreeMap<String, String>);

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical name for `raw`, if it is renamed.
    pub fn canonical(&self, raw: &str) -> Option<&str> {
        self.0.get(raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Move every renamed key's value to its canonical key.
    ///
    /// Unlisted keys pass through. When a renamed key lands on a key that
    /// also arrived raw, the renamed value wins.
    pub fn apply(&self, params: ParamMap) -> ParamMap {
        let (renamed, kept): (Vec<_>, Vec<_>) = params
            .into_iter()
            .partition(|(key, _)| self.0.contains_key(key));

        let mut out: ParamMap = kept.into_iter().collect();
        for (key, value) in renamed {
            let canonical = self.0.get(&key).cloned().unwrap_or(key);
            out.insert(canonical, value);
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
