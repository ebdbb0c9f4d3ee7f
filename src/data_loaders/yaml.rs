// ~/src/data_loaders/yaml.rs

use std::{fs, path::Path};

use serde_yaml::Value;

use crate::warn;

/// Reads and parses a YAML document. A missing file is silent, a file that
/// exists but does not parse is reported.
pub fn load_yaml(path: &Path) -> Option<Value> {
    let txt = fs::read_to_string(path).ok()?;

    match serde_yaml::from_str::<Value>(&txt) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("[RICKROLL][CONFIG] Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}
