//! Authoritative in-memory collections of tracked files and groups. The
//! store never touches disk itself; mutations schedule per-collection save
//! deadlines that the owner drains on its poll tick.

mod entry;
mod group;
pub mod persist;

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

pub use entry::{normalized_path, FileEntry, FileKind};
pub use group::{icon_for_name, FileGroup, GROUP_PRESETS, UNGROUPED_ID};
pub use persist::{BlobStore, DiskBlobStore, StoreError};

/// Quiet period after the last mutation before a collection is written out.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Files,
    Groups,
}

/// One deadline per collection; re-scheduling supersedes, so a burst of
/// edits produces exactly one write after the burst settles.
#[derive(Debug, Default)]
struct SavePlanner {
    files_due: Option<Instant>,
    groups_due: Option<Instant>,
}

impl SavePlanner {
    fn schedule(&mut self, collection: Collection, now: Instant) {
        let due = now + SAVE_DEBOUNCE;
        match collection {
            Collection::Files => self.files_due = Some(due),
            Collection::Groups => self.groups_due = Some(due),
        }
    }

    fn take_due(&mut self, now: Instant) -> Vec<Collection> {
        let mut due = Vec::new();
        if self.files_due.is_some_and(|at| now >= at) {
            self.files_due = None;
            due.push(Collection::Files);
        }
        if self.groups_due.is_some_and(|at| now >= at) {
            self.groups_due = None;
            due.push(Collection::Groups);
        }
        due
    }

    fn take_all(&mut self) -> Vec<Collection> {
        let mut pending = Vec::new();
        if self.files_due.take().is_some() {
            pending.push(Collection::Files);
        }
        if self.groups_due.take().is_some() {
            pending.push(Collection::Groups);
        }
        pending
    }
}

#[derive(Debug, Default)]
pub struct ShelfStore {
    files: Vec<FileEntry>,
    groups: Vec<FileGroup>,
    filter: String,
    planner: SavePlanner,
}

impl ShelfStore {
    pub fn new(files: Vec<FileEntry>, groups: Vec<FileGroup>) -> Self {
        Self {
            files,
            groups,
            filter: String::new(),
            planner: SavePlanner::default(),
        }
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn groups(&self) -> &[FileGroup] {
        &self.groups
    }

    pub fn file(&self, id: Uuid) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn group(&self, id: Uuid) -> Option<&FileGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    // --- file operations ---

    /// Adding an already-tracked path (compared case-insensitively where the
    /// host filesystem is) returns the existing entry untouched, regardless
    /// of the requested group.
    pub fn add_file(&mut self, path: &str, group_id: Option<Uuid>, now: Instant) -> FileEntry {
        let key = normalized_path(path);
        if let Some(existing) = self.files.iter().find(|f| normalized_path(&f.path) == key) {
            debug!(path, "duplicate add ignored");
            return existing.clone();
        }

        let entry = FileEntry::new(path, group_id.filter(|id| *id != UNGROUPED_ID));
        self.files.push(entry.clone());
        self.planner.schedule(Collection::Files, now);
        entry
    }

    pub fn add_files(&mut self, paths: &[String], group_id: Option<Uuid>, now: Instant) {
        for path in paths {
            self.add_file(path, group_id, now);
        }
    }

    pub fn remove_file(&mut self, id: Uuid, now: Instant) {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        if self.files.len() != before {
            self.planner.schedule(Collection::Files, now);
        }
    }

    pub fn move_file(&mut self, id: Uuid, group_id: Option<Uuid>, now: Instant) {
        if let Some(file) = self.files.iter_mut().find(|f| f.id == id) {
            file.group_id = group_id.filter(|gid| *gid != UNGROUPED_ID);
            self.planner.schedule(Collection::Files, now);
        }
    }

    pub fn touch_accessed(&mut self, id: Uuid, now: Instant) {
        if let Some(file) = self.files.iter_mut().find(|f| f.id == id) {
            file.last_accessed_at = Some(Utc::now());
            self.planner.schedule(Collection::Files, now);
        }
    }

    // --- group operations ---

    pub fn add_group(&mut self, name: &str, icon: &str, now: Instant) -> FileGroup {
        let group = FileGroup::new(name, icon, self.groups.len() as i32);
        self.groups.push(group.clone());
        self.planner.schedule(Collection::Groups, now);
        group
    }

    pub fn rename_group(&mut self, id: Uuid, name: &str, now: Instant) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.id == id) {
            group.name = name.to_string();
            self.planner.schedule(Collection::Groups, now);
        }
    }

    /// Members are re-parented to ungrouped before the group record goes;
    /// files are never deleted by this path.
    pub fn remove_group(&mut self, id: Uuid, now: Instant) {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        if self.groups.len() == before {
            return;
        }

        let mut touched_files = false;
        for file in self.files.iter_mut() {
            if file.group_id == Some(id) {
                file.group_id = None;
                touched_files = true;
            }
        }

        if touched_files {
            self.planner.schedule(Collection::Files, now);
        }
        self.planner.schedule(Collection::Groups, now);
    }

    pub fn toggle_expanded(&mut self, id: Uuid, now: Instant) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.id == id) {
            group.is_expanded = !group.is_expanded;
            self.planner.schedule(Collection::Groups, now);
        }
    }

    // --- filtering & reads ---

    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
    }

    fn matches_filter(&self, file: &FileEntry) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        let needle = self.filter.to_lowercase();
        file.name.to_lowercase().contains(&needle) || file.path.to_lowercase().contains(&needle)
    }

    /// Files in a group (`None` = ungrouped), with the active text filter
    /// applied before partitioning.
    pub fn files_in(&self, group_id: Option<Uuid>) -> Vec<&FileEntry> {
        let group_id = group_id.filter(|id| *id != UNGROUPED_ID);
        self.files
            .iter()
            .filter(|f| f.group_id == group_id && self.matches_filter(f))
            .collect()
    }

    /// User groups ascending by sort order, then the synthesized Ungrouped
    /// pseudo-group iff at least one file currently has no group.
    pub fn groups_ordered_with_ungrouped(&self) -> Vec<FileGroup> {
        let mut ordered = self.groups.clone();
        ordered.sort_by_key(|g| g.sort_order);

        if self.files.iter().any(|f| f.group_id.is_none()) {
            ordered.push(FileGroup::ungrouped());
        }
        ordered
    }

    // --- debounced persistence ---

    pub fn due_saves(&mut self, now: Instant) -> Vec<Collection> {
        self.planner.take_due(now)
    }

    /// Everything still scheduled, regardless of deadline. Shutdown must
    /// drain this so an in-flight debounced save is never dropped.
    pub fn flush_pending(&mut self) -> Vec<Collection> {
        self.planner.take_all()
    }

    pub fn replace_all(&mut self, files: Vec<FileEntry>, groups: Vec<FileGroup>, now: Instant) {
        self.files = files;
        self.groups = groups;
        self.planner.schedule(Collection::Files, now);
        self.planner.schedule(Collection::Groups, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> Instant {
        Instant::now()
    }

    #[test]
    fn add_file_suppresses_duplicate_paths() {
        let mut store = ShelfStore::default();
        let now = t0();
        let group = store.add_group("Work", "briefcase", now);

        let first = store.add_file("/a/b.txt", None, now);
        let second = store.add_file("/a/b.txt", Some(group.id), now);

        assert_eq!(first.id, second.id);
        assert_eq!(store.files().len(), 1);
        // The duplicate add did not re-group the original.
        assert_eq!(store.files()[0].group_id, None);
    }

    #[cfg(any(windows, target_os = "macos"))]
    #[test]
    fn duplicate_detection_is_case_insensitive_on_host() {
        let mut store = ShelfStore::default();
        let now = t0();
        store.add_file("/a/B.txt", None, now);
        store.add_file("/a/b.TXT", None, now);
        assert_eq!(store.files().len(), 1);
    }

    #[test]
    fn remove_group_cascades_to_ungrouped() {
        let mut store = ShelfStore::default();
        let now = t0();
        let group = store.add_group("Work", "briefcase", now);
        let a = store.add_file("/a.txt", Some(group.id), now);
        let b = store.add_file("/b.txt", Some(group.id), now);

        store.remove_group(group.id, now);

        assert!(store.group(group.id).is_none());
        assert_eq!(store.file(a.id).unwrap().group_id, None);
        assert_eq!(store.file(b.id).unwrap().group_id, None);
        assert_eq!(store.files().len(), 2);
    }

    #[test]
    fn ungrouped_pseudo_group_appears_iff_ungrouped_files_exist() {
        let mut store = ShelfStore::default();
        let now = t0();
        let group = store.add_group("Work", "briefcase", now);

        assert_eq!(store.groups_ordered_with_ungrouped().len(), 1);
        assert!(!store
            .groups_ordered_with_ungrouped()
            .iter()
            .any(|g| g.is_ungrouped()));

        let file = store.add_file("/a.txt", None, now);
        assert!(store
            .groups_ordered_with_ungrouped()
            .last()
            .unwrap()
            .is_ungrouped());

        store.move_file(file.id, Some(group.id), now);
        assert!(!store
            .groups_ordered_with_ungrouped()
            .iter()
            .any(|g| g.is_ungrouped()));
    }

    #[test]
    fn groups_sorted_by_sort_order_with_ungrouped_last() {
        let mut store = ShelfStore::default();
        let now = t0();
        let first = store.add_group("First", "briefcase", now);
        let second = store.add_group("Second", "person", now);
        store.add_file("/loose.txt", None, now);

        let ordered = store.groups_ordered_with_ungrouped();
        assert_eq!(ordered[0].id, first.id);
        assert_eq!(ordered[1].id, second.id);
        assert!(ordered[2].is_ungrouped());
    }

    #[test]
    fn filter_applies_to_name_and_path_before_partitioning() {
        let mut store = ShelfStore::default();
        let now = t0();
        let group = store.add_group("Work", "briefcase", now);
        store.add_file("/docs/Report.pdf", Some(group.id), now);
        store.add_file("/docs/notes.txt", Some(group.id), now);

        store.set_filter("report");
        assert_eq!(store.files_in(Some(group.id)).len(), 1);

        store.set_filter("docs");
        assert_eq!(store.files_in(Some(group.id)).len(), 2);

        store.set_filter("");
        assert_eq!(store.files_in(Some(group.id)).len(), 2);
    }

    #[test]
    fn files_in_treats_ungrouped_id_and_none_alike() {
        let mut store = ShelfStore::default();
        let now = t0();
        store.add_file("/loose.txt", None, now);
        assert_eq!(store.files_in(None).len(), 1);
        assert_eq!(store.files_in(Some(UNGROUPED_ID)).len(), 1);
    }

    #[test]
    fn removing_unknown_ids_is_a_no_op() {
        let mut store = ShelfStore::default();
        let now = t0();
        store.remove_file(Uuid::new_v4(), now);
        store.remove_group(Uuid::new_v4(), now);
        assert!(store.due_saves(now + SAVE_DEBOUNCE).is_empty());
    }

    #[test]
    fn burst_of_edits_coalesces_to_one_save_per_collection() {
        let mut store = ShelfStore::default();
        let now = t0();
        let group = store.add_group("Work", "briefcase", now);

        for i in 0..5 {
            store.add_file(&format!("/f{i}.txt"), Some(group.id), now);
        }

        // Nothing due inside the quiet period.
        assert!(store.due_saves(now + SAVE_DEBOUNCE / 2).is_empty());

        let due = store.due_saves(now + SAVE_DEBOUNCE);
        assert!(due.contains(&Collection::Files));
        assert!(due.contains(&Collection::Groups));
        assert_eq!(due.len(), 2);

        // Deadline consumed: no second fire.
        assert!(store.due_saves(now + SAVE_DEBOUNCE * 2).is_empty());
    }

    #[test]
    fn later_edit_supersedes_the_pending_deadline() {
        let mut store = ShelfStore::default();
        let now = t0();
        store.add_file("/a.txt", None, now);
        let later = now + SAVE_DEBOUNCE / 2;
        store.add_file("/b.txt", None, later);

        // The original deadline has passed but was superseded.
        assert!(store.due_saves(now + SAVE_DEBOUNCE).is_empty());
        assert_eq!(
            store.due_saves(later + SAVE_DEBOUNCE),
            vec![Collection::Files]
        );
    }

    #[test]
    fn flush_pending_drains_everything_scheduled() {
        let mut store = ShelfStore::default();
        let now = t0();
        store.add_file("/a.txt", None, now);
        store.add_group("Work", "briefcase", now);

        let pending = store.flush_pending();
        assert!(pending.contains(&Collection::Files));
        assert!(pending.contains(&Collection::Groups));
        assert!(store.flush_pending().is_empty());
    }

    #[test]
    fn touch_accessed_sets_timestamp_and_schedules_save() {
        let mut store = ShelfStore::default();
        let now = t0();
        let file = store.add_file("/a.txt", None, now);
        assert!(store.file(file.id).unwrap().last_accessed_at.is_none());

        store.due_saves(now + SAVE_DEBOUNCE);
        store.touch_accessed(file.id, now);

        assert!(store.file(file.id).unwrap().last_accessed_at.is_some());
        assert_eq!(
            store.due_saves(now + SAVE_DEBOUNCE),
            vec![Collection::Files]
        );
    }

    #[test]
    fn scenario_work_group_then_remove() {
        let mut store = ShelfStore::default();
        let now = t0();
        let work = store.add_group("Work", "briefcase", now);
        store.add_file("/a/b.txt", Some(work.id), now);

        let in_work = store.files_in(Some(work.id));
        assert_eq!(in_work.len(), 1);
        assert_eq!(in_work[0].name, "b.txt");
        assert_eq!(in_work[0].path, "/a/b.txt");
        assert_eq!(in_work[0].group_id, Some(work.id));
        assert!(store.files_in(None).is_empty());

        let ordered = store.groups_ordered_with_ungrouped();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, work.id);

        store.remove_group(work.id, now);

        let loose = store.files_in(None);
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].group_id, None);

        let ordered = store.groups_ordered_with_ungrouped();
        assert_eq!(ordered.len(), 1);
        assert!(ordered[0].is_ungrouped());
    }
}
