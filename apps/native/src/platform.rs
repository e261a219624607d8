//! Global pointer and mouse-button sampling, plus shelling out to the OS
//! for opening and revealing paths.

use std::process::Command;

use shelfcore_hover::Point;

#[cfg(windows)]
pub(crate) fn cursor_position() -> Option<Point> {
    use windows_sys::Win32::Foundation::POINT;
    use windows_sys::Win32::UI::WindowsAndMessaging::GetCursorPos;

    let mut point = POINT { x: 0, y: 0 };
    // SAFETY: GetCursorPos writes into the provided POINT on success.
    let ok = unsafe { GetCursorPos(&mut point) };
    if ok == 0 {
        return None;
    }
    Some(Point::new(point.x as f64, point.y as f64))
}

#[cfg(not(windows))]
pub(crate) fn cursor_position() -> Option<Point> {
    // No global cursor API wired up on this platform yet; hover detection
    // stays dormant and the tray/hotkey toggle still works.
    None
}

#[cfg(windows)]
pub(crate) fn mouse_button_down() -> bool {
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

    const VK_LBUTTON: i32 = 0x01;
    const VK_RBUTTON: i32 = 0x02;

    // SAFETY: GetAsyncKeyState has no preconditions.
    unsafe {
        (GetAsyncKeyState(VK_LBUTTON) as u16 & 0x8000) != 0
            || (GetAsyncKeyState(VK_RBUTTON) as u16 & 0x8000) != 0
    }
}

#[cfg(not(windows))]
pub(crate) fn mouse_button_down() -> bool {
    false
}

#[cfg(windows)]
pub(crate) fn open_path(path: &str) -> anyhow::Result<()> {
    Command::new("cmd").args(["/C", "start", "", path]).spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
pub(crate) fn open_path(path: &str) -> anyhow::Result<()> {
    Command::new("open").arg(path).spawn()?;
    Ok(())
}

#[cfg(not(any(windows, target_os = "macos")))]
pub(crate) fn open_path(path: &str) -> anyhow::Result<()> {
    Command::new("xdg-open").arg(path).spawn()?;
    Ok(())
}

#[cfg(windows)]
pub(crate) fn reveal_path(path: &str) -> anyhow::Result<()> {
    Command::new("explorer")
        .arg(format!("/select,{}", path))
        .spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
pub(crate) fn reveal_path(path: &str) -> anyhow::Result<()> {
    Command::new("open").args(["-R", path]).spawn()?;
    Ok(())
}

#[cfg(not(any(windows, target_os = "macos")))]
pub(crate) fn reveal_path(path: &str) -> anyhow::Result<()> {
    let parent = std::path::Path::new(path)
        .parent()
        .unwrap_or_else(|| std::path::Path::new("/"));
    Command::new("xdg-open").arg(parent).spawn()?;
    Ok(())
}
