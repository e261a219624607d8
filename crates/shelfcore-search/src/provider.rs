use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

/// FileEntry-shaped result from the opaque search capability.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub name: String,
    pub path: String,
}

/// Opaque system search capability. Implementations run on the bridge's
/// worker thread and may block.
pub trait SearchProvider: Send + Sync {
    /// Recently-used files, newest first.
    fn recent(&self, max: usize) -> Vec<SearchHit>;
    /// Name-contains matches for `query`.
    fn search(&self, query: &str, max: usize) -> Vec<SearchHit>;
}

/// Files modified within this window count as "recent".
pub const RECENT_WINDOW_DAYS: u64 = 14;

const WALK_DEPTH: usize = 4;

/// Directory-walking provider over the common user content dirs. Stands in
/// for a real OS content index, which is out of scope here.
pub struct WalkdirProvider {
    roots: Vec<PathBuf>,
}

impl WalkdirProvider {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn user_dirs() -> Self {
        let mut roots = Vec::new();
        if let Some(dirs) = directories::UserDirs::new() {
            for dir in [
                dirs.document_dir(),
                dirs.download_dir(),
                dirs.desktop_dir(),
                dirs.picture_dir(),
            ]
            .into_iter()
            .flatten()
            {
                roots.push(dir.to_path_buf());
            }
        }
        Self { roots }
    }
}

impl SearchProvider for WalkdirProvider {
    fn recent(&self, max: usize) -> Vec<SearchHit> {
        let cutoff = SystemTime::now() - Duration::from_secs(RECENT_WINDOW_DAYS * 24 * 60 * 60);
        let mut found: Vec<(SearchHit, SystemTime)> = Vec::new();

        for root in &self.roots {
            for entry in WalkDir::new(root)
                .max_depth(WALK_DEPTH)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) else {
                    continue;
                };
                if modified < cutoff {
                    continue;
                }

                found.push((
                    SearchHit {
                        name: entry.file_name().to_string_lossy().to_string(),
                        path: entry.path().to_string_lossy().to_string(),
                    },
                    modified,
                ));
            }
        }

        found.sort_by(|a, b| b.1.cmp(&a.1));
        found.into_iter().take(max).map(|(hit, _)| hit).collect()
    }

    fn search(&self, query: &str, max: usize) -> Vec<SearchHit> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();

        for root in &self.roots {
            for entry in WalkDir::new(root)
                .max_depth(WALK_DEPTH)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name.to_lowercase().contains(&needle) {
                    continue;
                }

                results.push(SearchHit {
                    name,
                    path: entry.path().to_string_lossy().to_string(),
                });

                if results.len() >= max {
                    return results;
                }
            }
        }

        results
    }
}
