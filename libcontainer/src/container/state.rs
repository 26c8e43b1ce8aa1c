//! The State Store (spec.md §4.1): a directory-backed key-value store for
//! container records, one subdirectory per id, written with rename-into-place
//! discipline so a concurrent reader never observes a half-written file.

use std::fs;
use std::path::PathBuf;

use nix::sys::stat::Mode;
use serde::{Deserialize, Serialize};

use crate::utils::create_dir_all_with_mode;

const RECORD_FILE: &str = "state.json";
const DIR_MODE: Mode = Mode::from_bits_truncate(0o755);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Stopped,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Container,
    Vm,
}

/// The persisted per-container metadata object (spec.md §4.1 "Encoding").
/// Unknown keys are ignored by `serde_json` on read by default; a state
/// name outside the enum fails to deserialize the whole record, so the
/// loader falls back to `Created` itself rather than relying on serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: String,
    pub bundle_path: PathBuf,
    pub state: ContainerState,
    pub mode: RuntimeMode,
    #[serde(default)]
    pub pid: i32,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: String,
    bundle_path: PathBuf,
    state: String,
    #[serde(default = "default_mode")]
    mode: RuntimeMode,
    #[serde(default)]
    pid: i32,
}

fn default_mode() -> RuntimeMode {
    RuntimeMode::Container
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("container {0} does not exist")]
    NotFound(String),
    #[error("failed to read state for {0}")]
    Read(String, #[source] std::io::Error),
    #[error("state record for {0} is malformed")]
    Malformed(String, #[source] serde_json::Error),
    #[error("failed to write state for {0}")]
    Write(String, #[source] std::io::Error),
    #[error("failed to remove state for {0}")]
    Remove(String, #[source] std::io::Error),
    #[error("failed to create state directory for {0}")]
    Dir(String, #[source] anyhow::Error),
}

pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn container_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.container_dir(id).join(RECORD_FILE)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.record_path(id).is_file()
    }

    /// Writes `record` via a temporary sibling file plus rename, so a
    /// concurrent `load` observes either the old or the new contents.
    pub fn save(&self, record: &ContainerRecord) -> Result<(), StateError> {
        let dir = self.container_dir(&record.id);
        create_dir_all_with_mode(&dir, DIR_MODE)
            .map_err(|e| StateError::Dir(record.id.clone(), e))?;

        let body = serde_json::to_vec_pretty(record)
            .expect("ContainerRecord serialization cannot fail");
        let tmp = dir.join(format!("{RECORD_FILE}.tmp"));
        fs::write(&tmp, &body).map_err(|e| StateError::Write(record.id.clone(), e))?;
        fs::rename(&tmp, self.record_path(&record.id))
            .map_err(|e| StateError::Write(record.id.clone(), e))?;
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<ContainerRecord, StateError> {
        let path = self.record_path(id);
        let data = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StateError::NotFound(id.to_string())
            } else {
                StateError::Read(id.to_string(), e)
            }
        })?;

        let raw: RawRecord = serde_json::from_str(&data)
            .map_err(|e| StateError::Malformed(id.to_string(), e))?;

        // Unrecognised state strings fall back to `Created` (spec.md §9:
        // intentional; the record's `state` field is still set exactly once).
        let state = match raw.state.as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "stopped" => ContainerState::Stopped,
            "paused" => ContainerState::Paused,
            _ => ContainerState::Created,
        };

        Ok(ContainerRecord {
            id: raw.id,
            bundle_path: raw.bundle_path,
            state,
            mode: raw.mode,
            pid: raw.pid,
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), StateError> {
        let path = self.record_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StateError::Remove(id.to_string(), e)),
        }
        let _ = fs::remove_dir(self.container_dir(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> ContainerRecord {
        ContainerRecord {
            id: id.to_string(),
            bundle_path: PathBuf::from("/tmp/bundle"),
            state: ContainerState::Created,
            mode: RuntimeMode::Container,
            pid: 0,
        }
    }

    #[test]
    fn create_then_exists_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().to_path_buf());
        let record = sample("c1");

        assert!(!store.exists("c1"));
        store.save(&record).unwrap();
        assert!(store.exists("c1"));

        let loaded = store.load("c1").unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().to_path_buf());
        assert!(matches!(store.load("ghost"), Err(StateError::NotFound(_))));
    }

    #[test]
    fn unknown_state_string_falls_back_to_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().to_path_buf());
        let sub = dir.path().join("c2");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(
            sub.join(RECORD_FILE),
            r#"{"id":"c2","bundle_path":"/b","state":"zombie","mode":"container","pid":0}"#,
        )
        .unwrap();

        let loaded = store.load("c2").unwrap();
        assert_eq!(loaded.state, ContainerState::Created);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().to_path_buf());
        store.save(&sample("c3")).unwrap();

        store.delete("c3").unwrap();
        assert!(!store.exists("c3"));
        store.delete("c3").unwrap();
    }
}
