//! Popup lifecycle. Every hide path funnels through
//! [`PopupController::request_hide`] so watchdog teardown and hover-state
//! reset always travel together.

pub mod watchdog;

use shelfcore_hover::Rect;
use tracing::debug;

pub use watchdog::{
    DismissalWatchdog, InputKind, InputMonitor, SubscriptionId, HIDE_GRACE, OUTSIDE_TOLERANCE,
};

pub const POPUP_WIDTH: f64 = 320.0;
pub const POPUP_HEIGHT: f64 = 450.0;
/// Gap between the top screen edge and the popup.
pub const TOP_MARGIN: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

/// Horizontally centered on the display, a small fixed margin below the top
/// edge.
pub fn popup_placement(screen_width: f64) -> Placement {
    Placement {
        x: ((screen_width - POPUP_WIDTH) / 2.0).max(0.0),
        y: TOP_MARGIN,
    }
}

pub fn popup_rect(screen_width: f64) -> Rect {
    let placement = popup_placement(screen_width);
    Rect::new(placement.x, placement.y, POPUP_WIDTH, POPUP_HEIGHT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupPhase {
    #[default]
    Hidden,
    Showing,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideReason {
    Escape,
    OutsideClick,
    GraceExpired,
    FocusLost,
    Toggle,
    Explicit,
}

/// What the host must do in response to a transition, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    ShowSurface(Placement),
    FocusSurface,
    ArmWatchdog,
    DisarmWatchdog,
    HideSurface,
    ResetHover,
}

#[derive(Debug, Default)]
pub struct PopupController {
    phase: PopupPhase,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PopupPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.phase, PopupPhase::Visible)
    }

    /// Hover-start from the detector. Idempotent while not Hidden: a second
    /// hover-start during Showing/Visible is a no-op.
    pub fn hover_start(&mut self, screen_width: f64) -> Vec<Effect> {
        match self.phase {
            PopupPhase::Hidden => self.begin_show(screen_width),
            PopupPhase::Showing | PopupPhase::Visible => Vec::new(),
        }
    }

    /// Tray click or hotkey: show while Hidden, hide otherwise.
    pub fn toggle(&mut self, screen_width: f64) -> Vec<Effect> {
        match self.phase {
            PopupPhase::Hidden => self.begin_show(screen_width),
            PopupPhase::Showing | PopupPhase::Visible => self.request_hide(HideReason::Toggle),
        }
    }

    /// The surface reports it is on screen and focused.
    pub fn surface_shown(&mut self) -> Vec<Effect> {
        match self.phase {
            PopupPhase::Showing => {
                self.phase = PopupPhase::Visible;
                vec![Effect::ArmWatchdog]
            }
            _ => Vec::new(),
        }
    }

    /// The single hide funnel. No-op while already Hidden.
    pub fn request_hide(&mut self, reason: HideReason) -> Vec<Effect> {
        match self.phase {
            PopupPhase::Hidden => Vec::new(),
            PopupPhase::Showing | PopupPhase::Visible => {
                debug!(?reason, "hiding popup");
                self.phase = PopupPhase::Hidden;
                vec![Effect::DisarmWatchdog, Effect::HideSurface, Effect::ResetHover]
            }
        }
    }

    fn begin_show(&mut self, screen_width: f64) -> Vec<Effect> {
        self.phase = PopupPhase::Showing;
        vec![
            Effect::ShowSurface(popup_placement(screen_width)),
            Effect::FocusSurface,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN_W: f64 = 1920.0;

    #[test]
    fn hover_start_shows_then_arms_on_surface_shown() {
        let mut controller = PopupController::new();

        let effects = controller.hover_start(SCREEN_W);
        assert_eq!(controller.phase(), PopupPhase::Showing);
        assert_eq!(
            effects,
            vec![
                Effect::ShowSurface(popup_placement(SCREEN_W)),
                Effect::FocusSurface
            ]
        );

        assert_eq!(controller.surface_shown(), vec![Effect::ArmWatchdog]);
        assert!(controller.is_visible());
    }

    #[test]
    fn placement_is_centered_with_top_margin() {
        let placement = popup_placement(SCREEN_W);
        assert_eq!(placement.x, (SCREEN_W - POPUP_WIDTH) / 2.0);
        assert_eq!(placement.y, TOP_MARGIN);
    }

    #[test]
    fn redundant_hover_start_is_idempotent() {
        let mut controller = PopupController::new();
        controller.hover_start(SCREEN_W);
        controller.surface_shown();

        assert!(controller.hover_start(SCREEN_W).is_empty());
        assert!(controller.is_visible());
    }

    #[test]
    fn toggle_shows_while_hidden_and_hides_while_visible() {
        let mut controller = PopupController::new();

        assert!(!controller.toggle(SCREEN_W).is_empty());
        controller.surface_shown();
        assert!(controller.is_visible());

        let effects = controller.toggle(SCREEN_W);
        assert_eq!(
            effects,
            vec![Effect::DisarmWatchdog, Effect::HideSurface, Effect::ResetHover]
        );
        assert_eq!(controller.phase(), PopupPhase::Hidden);
    }

    #[test]
    fn every_hide_carries_teardown_and_hover_reset() {
        for reason in [
            HideReason::Escape,
            HideReason::OutsideClick,
            HideReason::GraceExpired,
            HideReason::FocusLost,
            HideReason::Explicit,
        ] {
            let mut controller = PopupController::new();
            controller.hover_start(SCREEN_W);
            controller.surface_shown();

            let effects = controller.request_hide(reason);
            assert!(effects.contains(&Effect::DisarmWatchdog));
            assert!(effects.contains(&Effect::HideSurface));
            assert!(effects.contains(&Effect::ResetHover));
        }
    }

    #[test]
    fn hide_while_hidden_is_a_no_op() {
        let mut controller = PopupController::new();
        assert!(controller.request_hide(HideReason::Escape).is_empty());
        assert!(controller.surface_shown().is_empty());
    }
}
