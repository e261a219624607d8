//! Application service: startup load, debounced saves, shutdown flush,
//! export/import.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use shelfcore_config::Settings;
use shelfcore_store::persist;
use shelfcore_store::{
    icon_for_name, BlobStore, Collection, FileEntry, FileGroup, ShelfStore, StoreError,
};

/// Everything a single export carries; import replaces both collections
/// wholesale.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub files: Vec<FileEntry>,
    pub groups: Vec<FileGroup>,
    pub exported_at: DateTime<Utc>,
}

pub struct AppService<B: BlobStore> {
    pub store: ShelfStore,
    pub settings: Settings,
    blobs: B,
}

impl<B: BlobStore> AppService<B> {
    /// Load persisted state. A missing files blob is an empty shelf; a
    /// missing groups blob seeds the first-run starter groups.
    pub fn load(blobs: B, settings: Settings, now: Instant) -> Self {
        let files = persist::load_files(&blobs);
        let (groups, seeded) = match persist::load_groups(&blobs) {
            Some(groups) => (groups, false),
            None => (Vec::new(), true),
        };

        let mut store = ShelfStore::new(files, groups);
        if seeded {
            for name in ["Work", "Personal"] {
                store.add_group(name, icon_for_name(name), now);
            }
            info!("first run, seeded starter groups");
        }

        Self {
            store,
            settings,
            blobs,
        }
    }

    /// Run any save whose debounce deadline has passed. Call from the poll
    /// tick.
    pub fn maintain(&mut self, now: Instant) {
        let due = self.store.due_saves(now);
        self.write(&due);
    }

    /// Shutdown path: write everything still scheduled, synchronously. An
    /// in-flight debounced save is never dropped at exit.
    pub fn flush(&mut self) {
        let pending = self.store.flush_pending();
        if !pending.is_empty() {
            info!("flushing {} pending save(s) at shutdown", pending.len());
        }
        self.write(&pending);
    }

    fn write(&self, collections: &[Collection]) {
        for collection in collections {
            match collection {
                Collection::Files => persist::save_files(&self.blobs, self.store.files()),
                Collection::Groups => persist::save_groups(&self.blobs, self.store.groups()),
            }
        }
    }

    pub fn export(&self) -> Result<String, StoreError> {
        let bundle = ExportBundle {
            files: self.store.files().to_vec(),
            groups: self.store.groups().to_vec(),
            exported_at: Utc::now(),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Replace both collections from an export bundle and persist at once.
    pub fn import(&mut self, blob: &str, now: Instant) -> Result<(), StoreError> {
        let bundle: ExportBundle = serde_json::from_str(blob)?;
        self.store.replace_all(bundle.files, bundle.groups, now);
        self.flush();
        Ok(())
    }
}
