use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked file or folder on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub group_id: Option<Uuid>,
    pub added_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl FileEntry {
    pub fn new(path: &str, group_id: Option<Uuid>) -> Self {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());

        Self {
            id: Uuid::new_v4(),
            name,
            path: path.to_string(),
            group_id,
            added_at: Utc::now(),
            last_accessed_at: None,
        }
    }

    pub fn exists(&self) -> bool {
        Path::new(&self.path).exists()
    }

    pub fn is_directory(&self) -> bool {
        Path::new(&self.path).is_dir()
    }

    pub fn extension(&self) -> String {
        Path::new(&self.path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    pub fn kind(&self) -> FileKind {
        match self.extension().as_str() {
            "pdf" => FileKind::Pdf,
            "doc" | "docx" => FileKind::Word,
            "xls" | "xlsx" => FileKind::Excel,
            "ppt" | "pptx" => FileKind::Powerpoint,
            "txt" | "md" | "rtf" => FileKind::Text,
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "heic" => FileKind::Image,
            "mp4" | "mov" | "avi" | "mkv" => FileKind::Video,
            "mp3" | "wav" | "aac" | "m4a" => FileKind::Audio,
            "zip" | "rar" | "7z" | "tar" | "gz" => FileKind::Archive,
            "swift" | "py" | "js" | "ts" | "java" | "go" | "rs" => FileKind::Code,
            "html" | "css" | "json" | "xml" | "yml" | "yaml" => FileKind::Code,
            _ => {
                if self.is_directory() {
                    FileKind::Folder
                } else {
                    FileKind::Other
                }
            }
        }
    }
}

/// Extension-derived category, computed rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Word,
    Excel,
    Powerpoint,
    Text,
    Image,
    Video,
    Audio,
    Archive,
    Code,
    Folder,
    Other,
}

/// Duplicate-detection key for a path. The shipping platforms (Windows and
/// macOS) default to case-insensitive filesystems, so compare folded there.
pub fn normalized_path(path: &str) -> String {
    if cfg!(any(windows, target_os = "macos")) {
        path.to_lowercase()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_derived_from_final_component() {
        let entry = FileEntry::new("/a/b/report.pdf", None);
        assert_eq!(entry.name, "report.pdf");
        assert_eq!(entry.kind(), FileKind::Pdf);
    }

    #[test]
    fn kind_covers_code_and_media() {
        assert_eq!(FileEntry::new("/x/main.rs", None).kind(), FileKind::Code);
        assert_eq!(FileEntry::new("/x/a.heic", None).kind(), FileKind::Image);
        assert_eq!(FileEntry::new("/x/a.tar", None).kind(), FileKind::Archive);
    }

    #[test]
    fn missing_path_does_not_exist() {
        let entry = FileEntry::new("/definitely/not/here.txt", None);
        assert!(!entry.exists());
        assert!(!entry.is_directory());
    }
}
