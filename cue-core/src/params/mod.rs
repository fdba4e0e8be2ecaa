//! Parameter decoding.
//!
//! Template data arrives either as JSON or as XML, without saying which.
//! [`decode`] tries each format in turn, keeps the first success, and then
//! applies the [`RenameTable`]. It never fails: input nothing can parse
//! yields an empty map.

pub mod json;
pub mod rename;
pub mod xml;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::CueError;

pub use rename::RenameTable;

/// Normalized parameters: key to value.
pub type ParamMap = BTreeMap<String, String>;

type Stage = fn(&str) -> Result<ParamMap, CueError>;

/// Parsers tried in order; the first success wins.
const STAGES: &[(&str, Stage)] = &[("json", json::parse), ("xml", xml::parse)];

/// Decode a raw parameter payload and apply `renames`.
pub fn decode(raw: &str, renames: &RenameTable) -> ParamMap {
    let params = STAGES
        .iter()
        .find_map(|(name, stage)| match stage(raw) {
            Ok(params) => {
                debug!(stage = *name, count = params.len(), "parameters decoded");
                Some(params)
            }
            Err(e) => {
                debug!(stage = *name, "stage failed: {e}");
                None
            }
        })
        .unwrap_or_default();

    renames.apply(params)
}
