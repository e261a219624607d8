#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod platform;
mod ui;
mod windowing;

use std::sync::Arc;
use std::time::{Duration, Instant};

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager};
use iced::keyboard::{key, Event as KeyboardEvent, Key};
use iced::{widget, window, Event, Size, Subscription, Task, Theme};
use tracing::{debug, warn};
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use uuid::Uuid;

use shelfcore_config::{data_dir, ensure_settings_file, load_settings, settings_path};
use shelfcore_hover::{hot_zone_rect, HoverWatcher};
use shelfcore_popup::{
    popup_rect, DismissalWatchdog, Effect, HideReason, InputKind, InputMonitor, PopupController,
    SubscriptionId,
};
use shelfcore_search::{SearchBridge, WalkdirProvider};
use shelfcore_store::DiskBlobStore;
use shelfd::AppService;

use ui::view;
use windowing::{
    fetch_monitor_size, initialize_panel_hidden_mode, keep_search_input_focus,
    native_window_settings, show_popup_at,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TOGGLE_GUARD: Duration = Duration::from_millis(220);
const HOTKEY_RETRY_DELAY: Duration = Duration::from_millis(1200);
const FALLBACK_SCREEN_WIDTH: f64 = 1920.0;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    iced::application(
        move || {
            let mut app = App::new();

            match init_tray() {
                Ok((tray, open_id, quit_id)) => {
                    app._tray_icon = Some(tray);
                    app.menu_open_id = Some(open_id);
                    app.menu_quit_id = Some(quit_id);
                }
                Err(err) => warn!(%err, "tray icon unavailable"),
            }

            match init_hotkey() {
                Ok((manager, hotkey)) => {
                    app._hotkey_manager = Some(manager);
                    app._hotkey = Some(hotkey);
                }
                Err(err) => {
                    warn!(%err, "global hotkey unavailable, will retry");
                    app.hotkey_retry_after = Some(Instant::now() + HOTKEY_RETRY_DELAY);
                }
            }

            let tasks = Task::batch(vec![initialize_panel_hidden_mode(), fetch_monitor_size()]);
            (app, tasks)
        },
        update,
        view,
    )
    .title("ShelfDock")
    .theme(theme)
    .window(native_window_settings())
    .subscription(subscription)
    .run()
}

#[derive(Debug, Clone)]
pub(crate) enum Message {
    PollExternal,
    MonitorSize(Option<Size>),
    SurfaceShown,
    RuntimeEvent(Event),
    QueryChanged(String),
    OpenEntry(Uuid),
    RevealEntry(Uuid),
    RemoveEntry(Uuid),
    BeginDrag(Uuid),
    DropOnGroup(Option<Uuid>),
    ToggleGroup(Uuid),
    NewGroupNameChanged(String),
    SubmitNewGroup,
    BeginRenameGroup(Uuid, String),
    RenameDraftChanged(String),
    SubmitRenameGroup,
    RemoveGroup(Uuid),
    GroupHoverChanged(Option<Option<Uuid>>),
    OpenHit(String),
}

/// Accounting implementation of the watchdog's input-monitor seam. The
/// actual input feeds are the poll tick and the iced event subscription;
/// this tracks that every handle taken at arm time is released at disarm.
#[derive(Debug, Default)]
struct RuntimeInputMonitor {
    next: u64,
    active: Vec<SubscriptionId>,
}

impl InputMonitor for RuntimeInputMonitor {
    fn subscribe(&mut self, kind: InputKind) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.active.push(id);
        debug!(?kind, ?id, "input subscription opened");
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.active.retain(|held| *held != id);
        debug!(?id, "input subscription released");
    }
}

pub(crate) struct App {
    service: AppService<DiskBlobStore>,
    bridge: SearchBridge,
    query: String,
    new_group_name: String,
    rename_draft: Option<(Uuid, String)>,
    drag_payload: Option<Uuid>,
    search_input_id: widget::Id,
    hover: HoverWatcher,
    controller: PopupController,
    watchdog: DismissalWatchdog,
    monitor: RuntimeInputMonitor,
    screen_width: f64,
    settings_file: std::path::PathBuf,
    drop_hover: Option<Option<Uuid>>,
    last_toggle_at: Option<Instant>,
    hotkey_retry_after: Option<Instant>,
    _tray_icon: Option<TrayIcon>,
    menu_open_id: Option<MenuId>,
    menu_quit_id: Option<MenuId>,
    _hotkey_manager: Option<GlobalHotKeyManager>,
    _hotkey: Option<HotKey>,
}

impl App {
    fn new() -> Self {
        let settings_file = settings_path();
        let settings = ensure_settings_file(&settings_file);
        let service = AppService::load(DiskBlobStore::new(data_dir()), settings, Instant::now());
        let bridge = SearchBridge::new(Arc::new(WalkdirProvider::user_dirs()));

        Self {
            service,
            bridge,
            query: String::new(),
            new_group_name: String::new(),
            rename_draft: None,
            drag_payload: None,
            search_input_id: widget::Id::new("search-input"),
            hover: HoverWatcher::new(),
            controller: PopupController::new(),
            watchdog: DismissalWatchdog::new(),
            monitor: RuntimeInputMonitor::default(),
            screen_width: FALLBACK_SCREEN_WIDTH,
            settings_file,
            drop_hover: None,
            last_toggle_at: None,
            hotkey_retry_after: None,
            _tray_icon: None,
            menu_open_id: None,
            menu_quit_id: None,
            _hotkey_manager: None,
            _hotkey: None,
        }
    }
}

fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::PollExternal => poll_external(app),
        Message::MonitorSize(size) => {
            if let Some(size) = size {
                app.screen_width = size.width as f64;
            }
            Task::none()
        }
        Message::SurfaceShown => {
            let effects = app.controller.surface_shown();
            apply_effects(app, effects)
        }
        Message::RuntimeEvent(event) => handle_runtime_event(app, event),
        Message::QueryChanged(text) => {
            app.query = text.clone();
            app.service.store.set_filter(&text);
            app.bridge.set_query(&text, Instant::now());
            Task::none()
        }
        Message::OpenEntry(id) => {
            let Some(entry) = app.service.store.file(id).cloned() else {
                return Task::none();
            };
            if !entry.exists() {
                warn!(path = %entry.path, "entry missing on disk, not opening");
                return Task::none();
            }
            if let Err(err) = platform::open_path(&entry.path) {
                warn!(%err, path = %entry.path, "open failed");
                return Task::none();
            }
            app.service.store.touch_accessed(id, Instant::now());
            let effects = app.controller.request_hide(HideReason::Explicit);
            apply_effects(app, effects)
        }
        Message::RevealEntry(id) => {
            if let Some(entry) = app.service.store.file(id) {
                if let Err(err) = platform::reveal_path(&entry.path) {
                    warn!(%err, path = %entry.path, "reveal failed");
                }
            }
            Task::none()
        }
        Message::RemoveEntry(id) => {
            app.service.store.remove_file(id, Instant::now());
            Task::none()
        }
        Message::BeginDrag(id) => {
            app.drag_payload = Some(id);
            Task::none()
        }
        Message::DropOnGroup(group_id) => {
            if let Some(file_id) = app.drag_payload.take() {
                app.service.store.move_file(file_id, group_id, Instant::now());
            }
            Task::none()
        }
        Message::ToggleGroup(id) => {
            app.service.store.toggle_expanded(id, Instant::now());
            Task::none()
        }
        Message::NewGroupNameChanged(text) => {
            app.new_group_name = text;
            Task::none()
        }
        Message::SubmitNewGroup => {
            let name = app.new_group_name.trim().to_string();
            if !name.is_empty() {
                let icon = shelfcore_store::icon_for_name(&name);
                app.service.store.add_group(&name, icon, Instant::now());
                app.new_group_name.clear();
            }
            Task::none()
        }
        Message::BeginRenameGroup(id, current) => {
            app.rename_draft = Some((id, current));
            Task::none()
        }
        Message::RenameDraftChanged(text) => {
            if let Some((_, draft)) = app.rename_draft.as_mut() {
                *draft = text;
            }
            Task::none()
        }
        Message::SubmitRenameGroup => {
            if let Some((id, draft)) = app.rename_draft.take() {
                let name = draft.trim().to_string();
                if !name.is_empty() {
                    app.service.store.rename_group(id, &name, Instant::now());
                }
            }
            Task::none()
        }
        Message::RemoveGroup(id) => {
            app.service.store.remove_group(id, Instant::now());
            Task::none()
        }
        Message::GroupHoverChanged(target) => {
            app.drop_hover = target;
            Task::none()
        }
        Message::OpenHit(path) => {
            if let Err(err) = platform::open_path(&path) {
                warn!(%err, %path, "open failed");
                return Task::none();
            }
            let effects = app.controller.request_hide(HideReason::Explicit);
            apply_effects(app, effects)
        }
    }
}

/// The 100ms driver: samples the global pointer for the hover watcher and
/// the dismissal watchdog, fires due debounce deadlines, and drains the
/// tray, menu and hotkey channels.
fn poll_external(app: &mut App) -> Task<Message> {
    let now = Instant::now();
    let mut tasks: Vec<Task<Message>> = Vec::new();

    // The blob is a few dozen bytes, so re-reading it every tick is cheap
    // and lets edits to settings.json apply on the next sample.
    app.service.settings = load_settings(&app.settings_file);

    if let Some(pointer) = platform::cursor_position() {
        if app
            .hover
            .sample(pointer, app.screen_width, &app.service.settings, now)
            .is_some()
        {
            let effects = app.controller.hover_start(app.screen_width);
            tasks.push(apply_effects(app, effects));
        }

        if app.watchdog.is_armed() {
            let popup = popup_rect(app.screen_width);
            let zone = hot_zone_rect(app.screen_width, &app.service.settings);

            if app.watchdog.observe_pointer(pointer, popup, zone, now) {
                let effects = app.controller.request_hide(HideReason::GraceExpired);
                tasks.push(apply_effects(app, effects));
            } else if platform::mouse_button_down()
                && app.watchdog.observe_mouse_down(pointer, popup)
            {
                let effects = app.controller.request_hide(HideReason::OutsideClick);
                tasks.push(apply_effects(app, effects));
            }
        }

        if app.drag_payload.is_some() && !platform::mouse_button_down() {
            app.drag_payload = None;
        }
    }

    app.service.maintain(now);
    app.bridge.tick(now);

    if app._hotkey_manager.is_none() || app._hotkey.is_none() {
        let should_retry = app.hotkey_retry_after.is_none_or(|due| now >= due);
        if should_retry {
            match init_hotkey() {
                Ok((manager, hotkey)) => {
                    app._hotkey_manager = Some(manager);
                    app._hotkey = Some(hotkey);
                    app.hotkey_retry_after = None;
                }
                Err(err) => {
                    debug!(%err, "hotkey retry failed");
                    app.hotkey_retry_after = Some(now + HOTKEY_RETRY_DELAY);
                }
            }
        }
    }

    let mut toggled = false;

    while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
        if let Some(hotkey) = &app._hotkey {
            if event.id == hotkey.id() {
                toggled = true;
            }
        }
    }

    while let Ok(event) = TrayIconEvent::receiver().try_recv() {
        if let TrayIconEvent::Click {
            button: MouseButton::Left,
            button_state: MouseButtonState::Up,
            ..
        } = event
        {
            toggled = true;
        }
    }

    while let Ok(event) = MenuEvent::receiver().try_recv() {
        if app.menu_open_id.as_ref().is_some_and(|id| event.id == *id) {
            toggled = true;
        }
        if app.menu_quit_id.as_ref().is_some_and(|id| event.id == *id) {
            app.service.flush();
            return iced::exit();
        }
    }

    if toggled {
        if let Some(last) = app.last_toggle_at {
            if now.duration_since(last) < TOGGLE_GUARD {
                return Task::batch(tasks);
            }
        }
        app.last_toggle_at = Some(now);

        let effects = app.controller.toggle(app.screen_width);
        tasks.push(apply_effects(app, effects));
    }

    Task::batch(tasks)
}

fn handle_runtime_event(app: &mut App, event: Event) -> Task<Message> {
    match event {
        Event::Keyboard(KeyboardEvent::KeyPressed { key, .. }) => {
            if matches!(key.as_ref(), Key::Named(key::Named::Escape))
                && app.watchdog.observe_escape()
            {
                let effects = app.controller.request_hide(HideReason::Escape);
                return apply_effects(app, effects);
            }
            Task::none()
        }
        Event::Window(window::Event::FileDropped(path)) => {
            let group_id = app.drop_hover.flatten();
            let path = path.to_string_lossy().to_string();
            app.service.store.add_file(&path, group_id, Instant::now());
            Task::none()
        }
        Event::Window(window::Event::Unfocused) => {
            if app.watchdog.is_armed() {
                // A tray click steals focus before its toggle event arrives;
                // starting the guard here keeps that toggle from instantly
                // re-showing the popup this hide is dismissing.
                app.last_toggle_at = Some(Instant::now());
                let effects = app.controller.request_hide(HideReason::FocusLost);
                return apply_effects(app, effects);
            }
            Task::none()
        }
        _ => Task::none(),
    }
}

/// Runs controller effects in order: window tasks go to the iced runtime,
/// watchdog and hover bookkeeping applies immediately.
fn apply_effects(app: &mut App, effects: Vec<Effect>) -> Task<Message> {
    let mut tasks: Vec<Task<Message>> = Vec::new();

    for effect in effects {
        match effect {
            Effect::ShowSurface(placement) => {
                app.bridge.refresh_recent();
                tasks.push(show_popup_at(placement));
            }
            Effect::FocusSurface => {
                tasks.push(keep_search_input_focus(app.search_input_id.clone()));
                tasks.push(Task::done(Message::SurfaceShown));
            }
            Effect::ArmWatchdog => app.watchdog.arm(&mut app.monitor),
            Effect::DisarmWatchdog => app.watchdog.disarm(&mut app.monitor),
            Effect::HideSurface => tasks.push(initialize_panel_hidden_mode()),
            Effect::ResetHover => app.hover.reset_hover_state(),
        }
    }

    Task::batch(tasks)
}

fn theme(_app: &App) -> Theme {
    Theme::TokyoNight
}

fn subscription(_app: &App) -> Subscription<Message> {
    Subscription::batch(vec![
        iced::time::every(POLL_INTERVAL).map(|_| Message::PollExternal),
        iced::event::listen().map(Message::RuntimeEvent),
    ])
}

fn init_hotkey() -> anyhow::Result<(GlobalHotKeyManager, HotKey)> {
    let manager = GlobalHotKeyManager::new()?;
    let hotkey = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::Space);

    manager.register(hotkey)?;

    Ok((manager, hotkey))
}

fn init_tray() -> anyhow::Result<(TrayIcon, MenuId, MenuId)> {
    let icon = build_tray_icon()?;
    let menu = Menu::new();
    let open = MenuItem::new("Open Shelf", true, None);
    let quit = MenuItem::new("Quit", true, None);

    menu.append(&open)?;
    menu.append(&quit)?;

    let tray = TrayIconBuilder::new()
        .with_tooltip("ShelfDock")
        .with_icon(icon)
        .with_menu(Box::new(menu))
        .build()?;

    Ok((tray, open.id().clone(), quit.id().clone()))
}

fn build_tray_icon() -> anyhow::Result<Icon> {
    let width = 16;
    let height = 16;
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);

    // A small tray glyph: open-topped box with a raised lid line.
    for y in 0..height {
        for x in 0..width {
            let wall = (x <= 1 || x >= width - 2) && y >= 5;
            let floor = y >= height - 2;
            let lid = y == 3 && (4..width - 4).contains(&x);

            let (r, g, b, a) = if wall || floor || lid {
                (125, 207, 255, 255)
            } else {
                (0, 0, 0, 0)
            };

            rgba.extend_from_slice(&[r, g, b, a]);
        }
    }

    Ok(Icon::from_rgba(rgba, width, height)?)
}
