//! Debounced bridge to the file search provider. Queries settle on the
//! trailing edge, run on a worker thread, and outcomes whose job id has
//! been superseded are dropped.

mod provider;

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

pub use provider::{SearchHit, SearchProvider, WalkdirProvider, RECENT_WINDOW_DAYS};

/// Quiet period after the last keystroke before a query is issued.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const RECENT_CAP: usize = 5;
pub const SEARCH_CAP: usize = 20;
/// Fetched before filtering so exclusions do not starve the capped list.
pub const OVERFETCH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Recent,
    Search,
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub job_id: u64,
    pub kind: QueryKind,
    pub hits: Vec<SearchHit>,
}

/// Paths the shelf refuses to surface: hidden entries and recognized
/// system, cache and build-artifact locations.
pub fn is_surfaced(path: &str) -> bool {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if name.starts_with('.') || name.starts_with('$') {
        return false;
    }

    let lower = path.to_lowercase();
    // Application bundles look like folders full of noise, keep them out.
    if lower.ends_with(".app") {
        return false;
    }

    const EXCLUDED: &[&str] = &[
        "/.",
        "\\.",
        "/library/",
        "/system/",
        "/caches/",
        "/cache/",
        "/deriveddata/",
        "/node_modules/",
        "\\node_modules\\",
        "\\appdata\\local\\",
        "\\appdata\\locallow\\",
        "\\windows\\",
        "\\program files",
        "\\__pycache__\\",
        "/__pycache__/",
        "/target/debug/",
        "/target/release/",
        "\\target\\debug\\",
        "\\target\\release\\",
    ];

    !EXCLUDED.iter().any(|token| lower.contains(token))
}

pub struct SearchBridge {
    provider: Arc<dyn SearchProvider>,
    tx: mpsc::Sender<SearchOutcome>,
    rx: mpsc::Receiver<SearchOutcome>,
    pending: Option<(String, Instant)>,
    last_issued: Option<String>,
    job_counter: u64,
    active_search_job: Option<u64>,
    active_recent_job: Option<u64>,
    searching: bool,
    results: Vec<SearchHit>,
    recent: Vec<SearchHit>,
}

impl SearchBridge {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            provider,
            tx,
            rx,
            pending: None,
            last_issued: None,
            job_counter: 0,
            active_search_job: None,
            active_recent_job: None,
            searching: false,
            results: Vec::new(),
            recent: Vec::new(),
        }
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn recent(&self) -> &[SearchHit] {
        &self.recent
    }

    /// Record a keystroke. Supersedes any pending deadline, so only the
    /// value at rest gets issued.
    pub fn set_query(&mut self, text: &str, now: Instant) {
        self.pending = Some((text.to_string(), now + SEARCH_DEBOUNCE));
    }

    /// Kick off (or re-run) the recent-files query.
    pub fn refresh_recent(&mut self) {
        let job_id = self.next_job();
        self.active_recent_job = Some(job_id);
        self.spawn_worker(job_id, QueryKind::Recent, String::new());
    }

    /// Poll-tick driver: fires a due pending query and drains worker
    /// outcomes. Returns true when visible results changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some((text, due)) = self.pending.clone() {
            if now >= due {
                self.pending = None;
                self.issue(text);
            }
        }

        let mut changed = false;
        while let Ok(outcome) = self.rx.try_recv() {
            changed |= self.handle_outcome(outcome);
        }
        changed
    }

    fn issue(&mut self, text: String) {
        if self.last_issued.as_deref() == Some(text.as_str()) {
            debug!(query = %text, "identical consecutive query suppressed");
            return;
        }
        self.last_issued = Some(text.clone());

        if text.is_empty() {
            // Empty query clears results and the searching indicator.
            self.active_search_job = None;
            self.searching = false;
            self.results.clear();
            return;
        }

        let job_id = self.next_job();
        self.active_search_job = Some(job_id);
        self.searching = true;
        self.spawn_worker(job_id, QueryKind::Search, text);
    }

    /// Apply one worker outcome; stale job ids are discarded.
    pub fn handle_outcome(&mut self, outcome: SearchOutcome) -> bool {
        let active = match outcome.kind {
            QueryKind::Search => self.active_search_job,
            QueryKind::Recent => self.active_recent_job,
        };
        if active != Some(outcome.job_id) {
            debug!(job_id = outcome.job_id, "stale query outcome discarded");
            return false;
        }

        match outcome.kind {
            QueryKind::Search => {
                self.active_search_job = None;
                self.searching = false;
                self.results = filter_and_cap(outcome.hits, SEARCH_CAP);
            }
            QueryKind::Recent => {
                self.active_recent_job = None;
                self.recent = filter_and_cap(outcome.hits, RECENT_CAP);
            }
        }
        true
    }

    fn next_job(&mut self) -> u64 {
        self.job_counter += 1;
        self.job_counter
    }

    fn spawn_worker(&self, job_id: u64, kind: QueryKind, query: String) {
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let hits = match kind {
                QueryKind::Recent => provider.recent(OVERFETCH),
                QueryKind::Search => provider.search(&query, OVERFETCH),
            };
            // Receiver gone means shutdown; nothing to report.
            let _ = tx.send(SearchOutcome { job_id, kind, hits });
        });
    }
}

fn filter_and_cap(hits: Vec<SearchHit>, cap: usize) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|hit| is_surfaced(&hit.path))
        .take(cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider double recording every query it receives.
    #[derive(Default)]
    struct RecordingProvider {
        queries: std::sync::Mutex<Vec<String>>,
    }

    impl SearchProvider for RecordingProvider {
        fn recent(&self, _max: usize) -> Vec<SearchHit> {
            Vec::new()
        }

        fn search(&self, query: &str, max: usize) -> Vec<SearchHit> {
            self.queries.lock().unwrap().push(query.to_string());
            (0..max)
                .map(|i| SearchHit {
                    name: format!("{query}-{i}.txt"),
                    path: format!("/home/user/docs/{query}-{i}.txt"),
                })
                .collect()
        }
    }

    fn bridge_with_recorder() -> (SearchBridge, Arc<RecordingProvider>) {
        let provider = Arc::new(RecordingProvider::default());
        (SearchBridge::new(provider.clone()), provider)
    }

    fn drain_until_settled(bridge: &mut SearchBridge, now: Instant) {
        // Worker threads are real; poll until the active job reports back.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while (bridge.active_search_job.is_some() || bridge.active_recent_job.is_some())
            && std::time::Instant::now() < deadline
        {
            bridge.tick(now + SEARCH_DEBOUNCE * 10);
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn debounce_drops_intermediate_values() {
        let (mut bridge, provider) = bridge_with_recorder();
        let t0 = Instant::now();

        bridge.set_query("r", t0);
        bridge.set_query("re", t0 + Duration::from_millis(50));
        bridge.set_query("rep", t0 + Duration::from_millis(100));

        // Nothing issued inside the quiet window.
        bridge.tick(t0 + Duration::from_millis(150));
        assert!(provider.queries.lock().unwrap().is_empty());

        bridge.tick(t0 + Duration::from_millis(100) + SEARCH_DEBOUNCE);
        drain_until_settled(&mut bridge, t0);
        assert_eq!(*provider.queries.lock().unwrap(), vec!["rep".to_string()]);
    }

    #[test]
    fn identical_consecutive_query_is_suppressed() {
        let (mut bridge, provider) = bridge_with_recorder();
        let t0 = Instant::now();

        bridge.set_query("report", t0);
        bridge.tick(t0 + SEARCH_DEBOUNCE);
        drain_until_settled(&mut bridge, t0);

        bridge.set_query("report", t0 + SEARCH_DEBOUNCE * 2);
        bridge.tick(t0 + SEARCH_DEBOUNCE * 3);
        drain_until_settled(&mut bridge, t0);

        assert_eq!(provider.queries.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_query_clears_results_and_indicator() {
        let (mut bridge, _provider) = bridge_with_recorder();
        let t0 = Instant::now();

        bridge.set_query("report", t0);
        bridge.tick(t0 + SEARCH_DEBOUNCE);
        drain_until_settled(&mut bridge, t0);
        assert!(!bridge.results().is_empty());

        bridge.set_query("", t0 + SEARCH_DEBOUNCE * 2);
        bridge.tick(t0 + SEARCH_DEBOUNCE * 3);
        assert!(bridge.results().is_empty());
        assert!(!bridge.is_searching());
    }

    #[test]
    fn stale_outcomes_are_discarded() {
        let (mut bridge, _provider) = bridge_with_recorder();

        bridge.active_search_job = Some(7);
        let applied = bridge.handle_outcome(SearchOutcome {
            job_id: 3,
            kind: QueryKind::Search,
            hits: vec![SearchHit {
                name: "old.txt".into(),
                path: "/home/user/old.txt".into(),
            }],
        });
        assert!(!applied);
        assert!(bridge.results().is_empty());
        assert!(bridge.active_search_job.is_some());

        let applied = bridge.handle_outcome(SearchOutcome {
            job_id: 7,
            kind: QueryKind::Search,
            hits: vec![SearchHit {
                name: "new.txt".into(),
                path: "/home/user/new.txt".into(),
            }],
        });
        assert!(applied);
        assert_eq!(bridge.results().len(), 1);
        assert!(!bridge.is_searching());
    }

    #[test]
    fn results_are_filtered_then_capped() {
        let (mut bridge, _provider) = bridge_with_recorder();
        let mut hits: Vec<SearchHit> = (0..OVERFETCH)
            .map(|i| SearchHit {
                name: format!("f{i}.txt"),
                path: format!("/home/user/docs/f{i}.txt"),
            })
            .collect();
        hits[0].path = "/home/user/Library/Caches/f0.txt".into();
        hits[1].path = "/home/user/project/node_modules/f1.txt".into();
        hits[2].name = ".hidden".into();
        hits[2].path = "/home/user/.hidden".into();

        bridge.active_search_job = Some(1);
        bridge.handle_outcome(SearchOutcome {
            job_id: 1,
            kind: QueryKind::Search,
            hits,
        });

        assert_eq!(bridge.results().len(), SEARCH_CAP);
        assert!(bridge
            .results()
            .iter()
            .all(|hit| is_surfaced(&hit.path)));
    }

    #[test]
    fn recent_is_capped_at_five() {
        let (mut bridge, _provider) = bridge_with_recorder();
        let hits = (0..OVERFETCH)
            .map(|i| SearchHit {
                name: format!("r{i}.txt"),
                path: format!("/home/user/docs/r{i}.txt"),
            })
            .collect();

        bridge.active_recent_job = Some(1);
        bridge.handle_outcome(SearchOutcome {
            job_id: 1,
            kind: QueryKind::Recent,
            hits,
        });
        assert_eq!(bridge.recent().len(), RECENT_CAP);
    }

    #[test]
    fn surfacing_filter_recognizes_system_paths() {
        assert!(is_surfaced("/home/user/docs/report.pdf"));
        assert!(is_surfaced("C:\\Users\\u\\Documents\\report.pdf"));

        assert!(!is_surfaced("/Users/u/Library/Preferences/x.plist"));
        assert!(!is_surfaced("/Users/u/dev/app/DerivedData/x.o"));
        assert!(!is_surfaced("/home/user/repo/.git/config"));
        assert!(!is_surfaced("/home/user/app/node_modules/pkg/index.js"));
        assert!(!is_surfaced("C:\\Users\\u\\AppData\\Local\\Temp\\x.tmp"));
        assert!(!is_surfaced("C:\\Windows\\System32\\notepad.exe"));
        assert!(!is_surfaced("C:\\Program Files\\App\\app.exe"));
        assert!(!is_surfaced("/home/user/proj/__pycache__/mod.pyc"));
        assert!(!is_surfaced("/home/user/proj/target/debug/app"));
        assert!(!is_surfaced("/home/user/.bashrc"));
        assert!(!is_surfaced("C:\\$Recycle.Bin\\x"));
    }

    #[test]
    fn application_bundles_are_not_surfaced() {
        assert!(!is_surfaced("/Applications/Safari.app"));
        assert!(!is_surfaced("/Users/u/Downloads/Installer.APP"));
        // Only the bundle suffix is excluded, not names containing "app".
        assert!(is_surfaced("/home/user/docs/app-notes.txt"));
        assert!(is_surfaced("/home/user/docs/whatsapp.txt"));
    }
}
