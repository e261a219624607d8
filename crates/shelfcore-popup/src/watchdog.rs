//! Auto-dismissal while the popup is visible. "Inside" means the popup
//! rect grown by a tolerance margin or the hover hot-zone, so a pointer
//! traveling from the popup back toward the tray does not trip a hide.
//! Leaving both starts a single grace deadline; Escape and a mouse-down
//! outside the unexpanded popup rect bypass it.

use std::time::{Duration, Instant};

use shelfcore_hover::{Point, Rect};
use tracing::debug;

/// Pointer slack around the popup before it counts as "outside".
pub const OUTSIDE_TOLERANCE: f64 = 30.0;
/// Grace period between going outside and the auto-hide firing. Absorbs
/// brief overshoots past the popup edge.
pub const HIDE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    PointerMoves,
    GlobalClicks,
    LocalKeys,
}

/// Platform input-watching capability. Handles returned by `subscribe` must
/// be released with `unsubscribe`; the watchdog pairs that to disarm so a
/// leaked subscription is a bug the tests can catch.
pub trait InputMonitor {
    fn subscribe(&mut self, kind: InputKind) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

#[derive(Debug, Default)]
pub struct DismissalWatchdog {
    armed: bool,
    hide_due: Option<Instant>,
    subscriptions: Vec<SubscriptionId>,
}

impl DismissalWatchdog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn arm(&mut self, monitor: &mut dyn InputMonitor) {
        if self.armed {
            return;
        }
        self.armed = true;
        self.hide_due = None;
        self.subscriptions = vec![
            monitor.subscribe(InputKind::PointerMoves),
            monitor.subscribe(InputKind::GlobalClicks),
            monitor.subscribe(InputKind::LocalKeys),
        ];
    }

    pub fn disarm(&mut self, monitor: &mut dyn InputMonitor) {
        self.armed = false;
        self.hide_due = None;
        for id in self.subscriptions.drain(..) {
            monitor.unsubscribe(id);
        }
    }

    /// One pointer sample. Returns true when the grace deadline has expired
    /// and the popup should hide.
    pub fn observe_pointer(
        &mut self,
        pointer: Point,
        popup: Rect,
        hot_zone: Rect,
        now: Instant,
    ) -> bool {
        if !self.armed {
            return false;
        }

        let inside = popup.expanded(OUTSIDE_TOLERANCE).contains(pointer)
            || hot_zone.contains(pointer);

        if inside {
            self.hide_due = None;
            return false;
        }

        match self.hide_due {
            None => {
                debug!("pointer left popup, grace timer armed");
                self.hide_due = Some(now + HIDE_GRACE);
                false
            }
            Some(due) => now >= due,
        }
    }

    /// Global mouse-down: immediate hide when outside the unexpanded popup
    /// rect.
    pub fn observe_mouse_down(&self, pointer: Point, popup: Rect) -> bool {
        self.armed && !popup.contains(pointer)
    }

    /// Escape while the popup has focus: immediate hide.
    pub fn observe_escape(&self) -> bool {
        self.armed
    }
}
