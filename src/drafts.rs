//! Session drafts
//!
//! Every save attempt writes the recorder state under `session-<programId>`
//! before validation, so an interrupted or rejected save can be resumed.
//! Drafts are last-writer-wins and are removed once the session commits.

use crate::error::CollectionError;
use crate::session::SessionData;
use crate::types::MeasurementDimension;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage key for a program's draft
pub fn draft_key(program_id: &str) -> String {
    format!("session-{}", program_id)
}

/// Unsaved recorder state for one program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub program_id: String,
    pub program_name: String,
    pub dimension: MeasurementDimension,
    pub data: SessionData,
    /// When the session was opened; absent in drafts written by older hosts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Time of the save attempt that wrote the draft
    pub timestamp: DateTime<Utc>,
}

/// Key-value buffer holding JSON drafts
pub trait DraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, CollectionError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), CollectionError>;

    /// Remove a key; returns whether it existed
    fn remove(&mut self, key: &str) -> Result<bool, CollectionError>;

    fn put_draft(&mut self, draft: &SessionDraft) -> Result<(), CollectionError> {
        let json = serde_json::to_string(draft)?;
        self.set(&draft_key(&draft.program_id), json)?;
        tracing::debug!(program_id = %draft.program_id, "Draft written");
        Ok(())
    }

    fn get_draft(&self, program_id: &str) -> Result<Option<SessionDraft>, CollectionError> {
        match self.get(&draft_key(program_id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn remove_draft(&mut self, program_id: &str) -> Result<bool, CollectionError> {
        let removed = self.remove(&draft_key(program_id))?;
        if removed {
            tracing::debug!(program_id, "Draft removed");
        }
        Ok(removed)
    }
}

/// Drafts kept in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: HashMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, CollectionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CollectionError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, CollectionError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Drafts stored as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CollectionError {
    CollectionError::DraftStore(format!("{}: {}", path.display(), err))
}

impl DraftStore for FileDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, CollectionError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CollectionError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|e| io_error(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<bool, CollectionError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
