//! Key-based merging of parameter sequences.
//!
//! The merge is one level deep: an overlay node replaces the base node with
//! the same key wholesale, including its children. Keys are not required to
//! be unique; a repeated key overwrites the earlier node in place, so a
//! sequence behaves like an insertion-ordered map.

use crate::parameter::Parameter;
use std::collections::HashMap;

/// Merges `overlay` onto `base` by parameter key.
///
/// Untouched base nodes keep their position, replaced nodes take the
/// position of the first base node with that key, and overlay nodes with new
/// keys are appended in overlay order.
pub fn merge_parameters(base: &[Parameter], overlay: &[Parameter]) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = Vec::with_capacity(base.len() + overlay.len());
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for node in base.iter().chain(overlay.iter()) {
        match positions.get(node.key.as_str()) {
            Some(&idx) => merged[idx] = node.clone(),
            None => {
                positions.insert(node.key.as_str(), merged.len());
                merged.push(node.clone());
            }
        }
    }

    merged
}

/// Indexes a parameter sequence by key. Later nodes win on duplicate keys.
pub fn parameter_index(parameters: &[Parameter]) -> HashMap<&str, &Parameter> {
    parameters.iter().map(|p| (p.key.as_str(), p)).collect()
}
