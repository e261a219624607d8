use iced::widget::operation;
use iced::{widget, window, Point, Size, Task};

use shelfcore_popup::{Placement, POPUP_HEIGHT, POPUP_WIDTH};

use crate::Message;

pub(crate) const WINDOW_WIDTH: f32 = POPUP_WIDTH as f32;
pub(crate) const WINDOW_HEIGHT: f32 = POPUP_HEIGHT as f32;

pub(crate) fn native_window_settings() -> window::Settings {
    let mut settings = window::Settings::default();
    settings.size = Size::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    settings.min_size = Some(Size::new(WINDOW_WIDTH, WINDOW_HEIGHT));
    settings.max_size = Some(Size::new(WINDOW_WIDTH, WINDOW_HEIGHT));
    settings.position = window::Position::SpecificWith(start_hidden_position);
    settings.resizable = false;
    settings.decorations = false;
    settings.level = window::Level::AlwaysOnTop;
    settings.exit_on_close_request = false;
    settings.transparent = false;

    #[cfg(target_os = "windows")]
    {
        settings.platform_specific.skip_taskbar = true;
        settings.platform_specific.undecorated_shadow = false;
    }

    settings
}

/// Park the window above the top screen edge and make it click-through, so
/// the hidden popup can never intercept input.
pub(crate) fn initialize_panel_hidden_mode() -> Task<Message> {
    window::latest().then(move |maybe_id| {
        if let Some(id) = maybe_id {
            window::monitor_size(id).then(move |monitor| {
                let monitor = monitor.unwrap_or(Size::new(WINDOW_WIDTH, WINDOW_HEIGHT));
                let x = ((monitor.width - WINDOW_WIDTH) / 2.0).max(0.0);

                Task::batch(vec![
                    window::move_to(id, Point::new(x, -WINDOW_HEIGHT)),
                    window::enable_mouse_passthrough(id),
                ])
            })
        } else {
            Task::none()
        }
    })
}

pub(crate) fn show_popup_at(placement: Placement) -> Task<Message> {
    window::latest().then(move |maybe_id| {
        if let Some(id) = maybe_id {
            Task::batch(vec![
                window::move_to(id, Point::new(placement.x as f32, placement.y as f32)),
                window::disable_mouse_passthrough(id),
                window::gain_focus(id),
            ])
        } else {
            Task::none()
        }
    })
}

pub(crate) fn fetch_monitor_size() -> Task<Message> {
    window::latest().then(move |maybe_id| {
        if let Some(id) = maybe_id {
            window::monitor_size(id).map(Message::MonitorSize)
        } else {
            Task::none()
        }
    })
}

pub(crate) fn keep_search_input_focus(search_input_id: widget::Id) -> Task<Message> {
    Task::batch(vec![
        operation::focus(search_input_id.clone()),
        operation::move_cursor_to_end(search_input_id),
    ])
}

fn start_hidden_position(window: Size, monitor: Size) -> Point {
    let x = ((monitor.width - window.width) / 2.0).max(0.0);
    Point::new(x, -window.height)
}
