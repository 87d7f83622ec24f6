//! Overlay window shell: creation, platform tweaks, visibility and sizing

use log::{info, warn};
use serde_json::json;
use tauri::{AppHandle, Emitter, Manager, WebviewWindow};

use crate::context::AppContext;
use crate::models::WindowSize;
use crate::paths::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, WINDOW_EDGE_MARGIN};

#[cfg(target_os = "macos")]
use objc2::rc::Retained;
#[cfg(target_os = "macos")]
use objc2_app_kit::{NSWindow, NSWindowCollectionBehavior};

#[cfg(target_os = "windows")]
use windows::Win32::Foundation::HWND;
#[cfg(target_os = "windows")]
use windows::Win32::UI::WindowsAndMessaging::{
    SetWindowPos, HWND_NOTOPMOST, HWND_TOPMOST, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
};

pub const MAIN_WINDOW_LABEL: &str = "main";

/// Logical rectangle of a monitor's usable area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

/// Top-right placement inside the work area
pub fn initial_position(area: WorkArea) -> (f64, f64) {
    (
        area.x + area.width - DEFAULT_WINDOW_WIDTH - WINDOW_EDGE_MARGIN,
        area.y + WINDOW_EDGE_MARGIN,
    )
}

/// Applies a size request on top of the current logical size
pub fn resolve_size(current: (f64, f64), requested: WindowSize) -> (f64, f64) {
    fn pick(requested: Option<f64>, current: f64) -> f64 {
        match requested {
            Some(value) if value.is_finite() && value > 0.0 => value,
            _ => current,
        }
    }
    (
        pick(requested.width, current.0),
        pick(requested.height, current.1),
    )
}

fn primary_work_area(app: &AppHandle) -> Option<WorkArea> {
    let monitor = app.primary_monitor().ok().flatten()?;
    let scale = monitor.scale_factor();
    let area = monitor.work_area();
    Some(WorkArea {
        x: area.position.x as f64 / scale,
        y: area.position.y as f64 / scale,
        width: area.size.width as f64 / scale,
    })
}

pub fn create_main_window(app: &AppHandle) -> Result<WebviewWindow, String> {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
        return Ok(window);
    }

    let mut builder = tauri::WebviewWindowBuilder::new(
        app,
        MAIN_WINDOW_LABEL,
        tauri::WebviewUrl::App("index.html".into()),
    )
    .title("Overlay Chat")
    .inner_size(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT)
    .transparent(true)
    .decorations(false)
    .shadow(false)
    .always_on_top(true)
    .skip_taskbar(true)
    .resizable(true)
    .minimizable(false)
    .maximizable(false)
    .content_protected(true);

    if let Some(area) = primary_work_area(app) {
        let (x, y) = initial_position(area);
        builder = builder.position(x, y);
    }

    let window = builder
        .build()
        .map_err(|e| format!("Failed to create main window: {}", e))?;
    configure_overlay(&window)?;
    info!("[window] main window created");
    Ok(window)
}

#[cfg(target_os = "macos")]
fn configure_overlay(window: &WebviewWindow) -> Result<(), String> {
    window
        .with_webview(|webview| unsafe {
            let ns_window_ptr = webview.ns_window();
            if let Some(ns_window) = Retained::retain(ns_window_ptr as *mut NSWindow) {
                // Stay visible on every space, including over full-screen apps.
                let behavior = NSWindowCollectionBehavior::CanJoinAllSpaces
                    | NSWindowCollectionBehavior::FullScreenAuxiliary;
                ns_window.setCollectionBehavior(behavior);
            }
        })
        .map_err(|e| format!("Failed to configure overlay: {}", e))
}

#[cfg(target_os = "windows")]
fn configure_overlay(window: &WebviewWindow) -> Result<(), String> {
    pin_topmost(window, true)
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn configure_overlay(_window: &WebviewWindow) -> Result<(), String> {
    Ok(())
}

#[cfg(target_os = "windows")]
fn pin_topmost(window: &WebviewWindow, on_top: bool) -> Result<(), String> {
    let hwnd = window
        .hwnd()
        .map_err(|e| format!("Failed to get HWND: {}", e))?;
    let insert_after = if on_top { HWND_TOPMOST } else { HWND_NOTOPMOST };
    unsafe {
        SetWindowPos(
            HWND(hwnd.0),
            insert_after,
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
        )
        .map_err(|e| format!("SetWindowPos failed: {}", e))?;
    }
    Ok(())
}

fn main_window(app: &AppHandle) -> Option<WebviewWindow> {
    let window = app.get_webview_window(MAIN_WINDOW_LABEL);
    if window.is_none() {
        warn!("[window] main window not found");
    }
    window
}

fn emit_visibility(app: &AppHandle, visible: bool) {
    let _ = app.emit("window-visibility-changed", json!({ "visible": visible }));
}

pub fn show_main_window(app: &AppHandle) -> Result<(), String> {
    if let Some(window) = main_window(app) {
        window.show().map_err(|e| e.to_string())?;
        window.set_focus().map_err(|e| e.to_string())?;
        app.state::<AppContext>().set_visible(true);
        emit_visibility(app, true);
    }
    Ok(())
}

/// Hides without quitting; the toggle shortcut brings the window back
pub fn hide_main_window(app: &AppHandle) -> Result<(), String> {
    if let Some(window) = main_window(app) {
        window.hide().map_err(|e| e.to_string())?;
        app.state::<AppContext>().set_visible(false);
        emit_visibility(app, false);
    }
    Ok(())
}

/// Flips visibility and returns the new state
pub fn toggle_visibility(app: &AppHandle) -> Result<bool, String> {
    if app.state::<AppContext>().is_visible() {
        hide_main_window(app)?;
        Ok(false)
    } else {
        show_main_window(app)?;
        Ok(true)
    }
}

pub fn minimize_main_window(app: &AppHandle) -> Result<(), String> {
    if let Some(window) = main_window(app) {
        window.minimize().map_err(|e| e.to_string())?;
    }
    Ok(())
}

pub fn set_always_on_top(app: &AppHandle, on_top: bool) -> Result<(), String> {
    if let Some(window) = main_window(app) {
        window
            .set_always_on_top(on_top)
            .map_err(|e| format!("Failed to set always-on-top: {}", e))?;
        #[cfg(target_os = "windows")]
        pin_topmost(&window, on_top)?;
        info!("[window] always-on-top = {}", on_top);
    }
    Ok(())
}

pub fn set_main_window_size(app: &AppHandle, requested: WindowSize) -> Result<(), String> {
    let Some(window) = main_window(app) else {
        return Ok(());
    };
    let scale = window.scale_factor().map_err(|e| e.to_string())?;
    let current = window
        .inner_size()
        .map_err(|e| e.to_string())?
        .to_logical::<f64>(scale);
    let (width, height) = resolve_size((current.width, current.height), requested);
    window
        .set_size(tauri::Size::Logical(tauri::LogicalSize { width, height }))
        .map_err(|e| format!("Failed to resize window: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_starts_in_top_right_corner() {
        let area = WorkArea {
            x: 0.0,
            y: 0.0,
            width: 1920.0,
        };
        assert_eq!(initial_position(area), (1500.0, 20.0));
    }

    #[test]
    fn position_respects_offset_work_area() {
        let area = WorkArea {
            x: 1920.0,
            y: 25.0,
            width: 1440.0,
        };
        assert_eq!(initial_position(area), (2940.0, 45.0));
    }

    #[test]
    fn missing_or_zero_dimensions_keep_current() {
        let current = (400.0, 600.0);
        let request = WindowSize {
            width: Some(500.0),
            height: None,
        };
        assert_eq!(resolve_size(current, request), (500.0, 600.0));

        let request = WindowSize {
            width: Some(0.0),
            height: Some(720.0),
        };
        assert_eq!(resolve_size(current, request), (400.0, 720.0));

        assert_eq!(resolve_size(current, WindowSize::default()), current);
    }

    #[test]
    fn invalid_dimensions_are_ignored() {
        let request = WindowSize {
            width: Some(f64::NAN),
            height: Some(-10.0),
        };
        assert_eq!(resolve_size((400.0, 600.0), request), (400.0, 600.0));
    }
}
