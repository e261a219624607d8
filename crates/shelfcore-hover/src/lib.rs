//! Hot-zone detection over raw pointer samples. One debounced `HoverStart`
//! per sustained entry, nothing on exit. Coordinates are y-down with the
//! origin at the display's top-left.

use std::time::Instant;

use shelfcore_config::Settings;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Grown by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }
}

/// Hot-zone rectangle: horizontally centered, anchored to the top edge,
/// dimensions straight from Settings.
pub fn hot_zone_rect(screen_width: f64, settings: &Settings) -> Rect {
    let width = settings.hover_zone_width.min(screen_width);
    Rect::new(
        (screen_width - width) / 2.0,
        0.0,
        width,
        settings.hover_zone_height,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEvent {
    HoverStart,
}

/// Enter/exit debounce over the hot-zone.
///
/// The trigger deadline is fixed at zone entry; pointer jitter inside the
/// zone neither restarts nor stacks it. Leaving before the deadline cancels
/// the pending trigger, and leaving while hovering clears `is_hovering`
/// without emitting anything.
#[derive(Debug, Default)]
pub struct HoverWatcher {
    is_hovering: bool,
    pending_trigger: Option<Instant>,
}

impl HoverWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hovering(&self) -> bool {
        self.is_hovering
    }

    /// Feed one global pointer sample. Settings are read fresh each call so
    /// zone edits apply on the next sample.
    pub fn sample(
        &mut self,
        pointer: Point,
        screen_width: f64,
        settings: &Settings,
        now: Instant,
    ) -> Option<HoverEvent> {
        let zone = hot_zone_rect(screen_width, settings);
        let inside = zone.contains(pointer);

        if inside && !self.is_hovering {
            match self.pending_trigger {
                Some(due) if now >= due => {
                    self.is_hovering = true;
                    self.pending_trigger = None;
                    debug!("hover trigger fired");
                    return Some(HoverEvent::HoverStart);
                }
                Some(_) => {}
                None => {
                    self.pending_trigger = Some(now + settings.hover_delay_duration());
                }
            }
        } else if !inside && self.is_hovering {
            // Internal reset only; the watchdog owns dismissal.
            self.is_hovering = false;
            self.pending_trigger = None;
        } else if !inside {
            self.pending_trigger = None;
        }

        None
    }

    /// Must run on every hide path so the next zone entry can retrigger.
    pub fn reset_hover_state(&mut self) {
        self.is_hovering = false;
        self.pending_trigger = None;
    }
}
