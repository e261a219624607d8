use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed id of the synthesized Ungrouped pseudo-group. Never persisted,
/// never collides with a v4 id.
pub const UNGROUPED_ID: Uuid = Uuid::nil();

/// Preset (name, icon) pairs offered when creating a group.
pub const GROUP_PRESETS: &[(&str, &str)] = &[
    ("Work", "briefcase"),
    ("Personal", "person"),
    ("Development", "hammer"),
    ("Documents", "doc-text"),
    ("Downloads", "download"),
    ("Projects", "gear-folder"),
];

/// Icon for a new group: the preset glyph when the name matches one
/// (case-insensitive), "folder" otherwise.
pub fn icon_for_name(name: &str) -> &'static str {
    GROUP_PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, icon)| *icon)
        .unwrap_or("folder")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_expanded: bool,
    pub created_at: DateTime<Utc>,
}

impl FileGroup {
    pub fn new(name: &str, icon: &str, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            icon: icon.to_string(),
            sort_order,
            is_expanded: true,
            created_at: Utc::now(),
        }
    }

    /// Synthesized on every read, sorts after every user group.
    pub fn ungrouped() -> Self {
        Self {
            id: UNGROUPED_ID,
            name: "Ungrouped".to_string(),
            icon: "tray".to_string(),
            sort_order: i32::MAX,
            is_expanded: true,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_ungrouped(&self) -> bool {
        self.id == UNGROUPED_ID
    }
}
