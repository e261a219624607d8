//! Persistence gateway: a key-value blob store holding the "files" and
//! "groups" collections as pretty-printed JSON arrays.

use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::{FileEntry, FileGroup};

pub const FILES_KEY: &str = "files";
pub const GROUPS_KEY: &str = "groups";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable blob load/save. Absence of a blob is "nothing", not an error.
pub trait BlobStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

/// Blobs under `<dir>/<key>.json`.
pub struct DiskBlobStore {
    dir: PathBuf,
}

impl DiskBlobStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for DiskBlobStore {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.key_path(key)).ok()
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.key_path(key), blob)?;
        Ok(())
    }
}

/// Missing or undecodable blobs degrade to an empty collection.
pub fn load_files(blobs: &dyn BlobStore) -> Vec<FileEntry> {
    let Some(content) = blobs.load(FILES_KEY) else {
        return Vec::new();
    };

    match serde_json::from_str(&content) {
        Ok(files) => files,
        Err(err) => {
            warn!("undecodable files blob, starting empty: {err}");
            Vec::new()
        }
    }
}

pub fn load_groups(blobs: &dyn BlobStore) -> Option<Vec<FileGroup>> {
    let content = blobs.load(GROUPS_KEY)?;
    match serde_json::from_str(&content) {
        Ok(groups) => Some(groups),
        Err(err) => {
            warn!("undecodable groups blob, starting empty: {err}");
            Some(Vec::new())
        }
    }
}

/// Best-effort: failures are logged, never surfaced; the next debounced
/// write is the retry.
pub fn save_files(blobs: &dyn BlobStore, files: &[FileEntry]) {
    match serde_json::to_string_pretty(files) {
        Ok(blob) => {
            if let Err(err) = blobs.save(FILES_KEY, &blob) {
                warn!("failed to persist files: {err}");
            }
        }
        Err(err) => warn!("failed to encode files: {err}"),
    }
}

pub fn save_groups(blobs: &dyn BlobStore, groups: &[FileGroup]) {
    match serde_json::to_string_pretty(groups) {
        Ok(blob) => {
            if let Err(err) = blobs.save(GROUPS_KEY, &blob) {
                warn!("failed to persist groups: {err}");
            }
        }
        Err(err) => warn!("failed to encode groups: {err}"),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// In-memory gateway recording every save.
    #[derive(Default)]
    pub struct MemoryBlobStore {
        pub blobs: RefCell<HashMap<String, String>>,
        pub save_counts: RefCell<HashMap<String, usize>>,
    }

    impl BlobStore for MemoryBlobStore {
        fn load(&self, key: &str) -> Option<String> {
            self.blobs.borrow().get(key).cloned()
        }

        fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
            self.blobs
                .borrow_mut()
                .insert(key.to_string(), blob.to_string());
            *self
                .save_counts
                .borrow_mut()
                .entry(key.to_string())
                .or_insert(0) += 1;
            Ok(())
        }
    }
}
