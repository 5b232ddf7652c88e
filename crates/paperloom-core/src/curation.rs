//! User curation lists (read-only here)
//!
//! Owned and written by the browsing UI; the pipeline only consumes them.
//! The block-list gates the index, the saved-list is surfaced in status
//! reporting.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedEntry {
    pub id: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub blocked_at: String,
    #[serde(default)]
    pub blocked_by: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockList {
    #[serde(default)]
    pub blocked: Vec<BlockedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEntry {
    pub id: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub saved_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedList {
    #[serde(default)]
    pub saved: Vec<SavedEntry>,
}

fn load_json_or_default<T: Default + serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

impl BlockList {
    pub fn load(path: &Path) -> Result<Self> {
        load_json_or_default(path)
    }

    pub fn id_set(&self) -> HashSet<String> {
        self.blocked.iter().map(|e| e.id.clone()).collect()
    }
}

impl SavedList {
    pub fn load(path: &Path) -> Result<Self> {
        load_json_or_default(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_empty_lists() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = BlockList::load(&dir.path().join("blocked.json")).unwrap();
        assert!(blocked.blocked.is_empty());
        let saved = SavedList::load(&dir.path().join("saved.json")).unwrap();
        assert!(saved.saved.is_empty());
    }

    #[test]
    fn block_list_parses_and_builds_id_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked.json");
        std::fs::write(
            &path,
            r#"{"blocked": [
                {"id": "2401.00001", "reason": "dup of 2312.99999",
                 "blockedAt": "2024-02-01T10:00:00Z", "blockedBy": "ui"},
                {"id": "2401.00002", "blockedAt": "2024-02-02T10:00:00Z", "blockedBy": "ui"}
            ]}"#,
        )
        .unwrap();
        let list = BlockList::load(&path).unwrap();
        assert_eq!(list.blocked.len(), 2);
        assert_eq!(list.blocked[0].reason.as_deref(), Some("dup of 2312.99999"));
        let ids = list.id_set();
        assert!(ids.contains("2401.00001"));
        assert!(ids.contains("2401.00002"));
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(BlockList::load(&path).is_err());
    }
}
