//! Action scripts: a JSON array of store actions, or one action per line.

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use chain_store::TransformStore;
use shared::protocol::StoreAction;
use tracing::{debug, info};

pub fn parse_script(raw: &str) -> Result<Vec<StoreAction>> {
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(raw).context("invalid action array");
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid action on line {}", index + 1))
        })
        .collect()
}

pub fn load_script(path: &Path) -> Result<Vec<StoreAction>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read script '{}'", path.display()))?;
    parse_script(&raw).with_context(|| format!("in script '{}'", path.display()))
}

/// Applies every action to a fresh store, in order.
pub fn replay(actions: Vec<StoreAction>) -> Arc<TransformStore> {
    let store = TransformStore::new();
    let total = actions.len();
    let mut changed = 0usize;
    for (index, action) in actions.into_iter().enumerate() {
        let name = action.name();
        if store.dispatch(action) {
            changed += 1;
        } else {
            debug!(index, action = name, "action left the state unchanged");
        }
    }
    info!(total, changed, "replayed script");
    store
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
