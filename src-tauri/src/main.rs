// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Module declarations
mod bridge;
mod client;
mod context;
mod conversation;
mod events;
mod models;
mod paths;
mod settings;
mod shortcuts;
mod window;

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use serde_json::json;
use tauri::{Emitter, Manager, RunEvent, WindowEvent};

use client::HttpTransport;
use context::AppContext;
use conversation::Conversation;
use models::ConversationSnapshot;
use settings::SettingsStore;
use window::MAIN_WINDOW_LABEL;

fn settings_path() -> PathBuf {
    paths::get_settings_path().unwrap_or_else(|e| {
        warn!("[startup] {}; keeping settings in the temp directory", e);
        std::env::temp_dir()
            .join(paths::APP_DIR_NAME)
            .join(paths::SETTINGS_FILE_NAME)
    })
}

// ============ Main ============

fn main() {
    let app = tauri::Builder::default()
        .setup(|app| {
            info!("=== Overlay Chat Starting ===");
            let handle = app.handle().clone();

            let settings = SettingsStore::new(settings_path());
            info!("[startup] settings file: {:?}", settings.path());
            settings.load();

            let emitter = handle.clone();
            let conversation = Conversation::new(move |snapshot: &ConversationSnapshot| {
                let _ = emitter.emit("conversation-updated", snapshot);
            });
            app.manage(AppContext::new(
                settings,
                conversation,
                Arc::new(HttpTransport::new()),
            ));

            window::create_main_window(&handle)?;

            // Forwarded to the UI only while the main window exists.
            let clear_handle = handle.clone();
            app.state::<AppContext>().clear_signal.register(move || {
                clear_handle.state::<AppContext>().conversation.clear();
                let _ = clear_handle.emit_to(MAIN_WINDOW_LABEL, "clear-conversation", ());
            });

            shortcuts::register_all(&handle);
            Ok(())
        })
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }
            let app = window.app_handle();
            match event {
                WindowEvent::CloseRequested { api, .. } => {
                    // Prevent the window from actually closing - just hide it
                    api.prevent_close();
                    let _ = window.hide();
                    if let Some(ctx) = app.try_state::<AppContext>() {
                        ctx.set_visible(false);
                    }
                    let _ = app.emit("window-visibility-changed", json!({ "visible": false }));
                }
                WindowEvent::Destroyed => {
                    if let Some(ctx) = app.try_state::<AppContext>() {
                        ctx.clear_signal.unregister();
                    }
                }
                _ => {}
            }
        })
        .plugin(
            tauri_plugin_log::Builder::new()
                .clear_targets()
                .targets([
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Stdout),
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("overlay-chat".into()),
                    }),
                ])
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| shortcuts::handle(app, shortcut, event))
                .build(),
        )
        .invoke_handler(tauri::generate_handler![
            bridge::get_settings,
            bridge::set_settings,
            bridge::get_api_key,
            bridge::set_api_key,
            bridge::minimize_window,
            bridge::close_window,
            bridge::toggle_always_on_top,
            bridge::set_window_size,
            bridge::get_conversation,
            bridge::submit_message,
            bridge::clear_conversation,
            bridge::log_from_frontend,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|handle, event| {
        if let RunEvent::Exit = event {
            info!("[shutdown] unregistering shortcuts");
            shortcuts::unregister_all(handle);
        }
    });
}
