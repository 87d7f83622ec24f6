//! Commands exposed to the UI webview

use log::{error, info, warn};
use tauri::{command, AppHandle, State};

use crate::context::AppContext;
use crate::conversation::SubmitOutcome;
use crate::models::{ConversationSnapshot, Settings, WindowSize};
use crate::settings::SettingsKey;
use crate::window;

// ============ Settings ============

#[command]
pub fn get_settings(ctx: State<'_, AppContext>) -> Settings {
    ctx.settings.current()
}

#[command]
pub fn set_settings(ctx: State<'_, AppContext>, settings: Settings) -> bool {
    let saved = ctx.settings.save(&settings);
    if !saved {
        warn!("[bridge] settings were not persisted");
    }
    saved
}

#[command]
pub fn get_api_key(ctx: State<'_, AppContext>) -> String {
    ctx.settings.get(SettingsKey::ApiKey)
}

#[command]
pub fn set_api_key(ctx: State<'_, AppContext>, api_key: String) -> bool {
    let saved = ctx.settings.set(SettingsKey::ApiKey, &api_key);
    if !saved {
        warn!("[bridge] api key was not persisted");
    }
    saved
}

// ============ Window ============

#[command]
pub fn minimize_window(app: AppHandle) -> Result<(), String> {
    window::minimize_main_window(&app)
}

#[command]
pub fn close_window(app: AppHandle) -> Result<(), String> {
    window::hide_main_window(&app)
}

#[command]
pub fn toggle_always_on_top(app: AppHandle, should_be_on_top: bool) -> Result<(), String> {
    window::set_always_on_top(&app, should_be_on_top)
}

#[command]
pub fn set_window_size(app: AppHandle, dimensions: WindowSize) -> Result<(), String> {
    window::set_main_window_size(&app, dimensions)
}

// ============ Conversation ============

#[command]
pub fn get_conversation(ctx: State<'_, AppContext>) -> ConversationSnapshot {
    ctx.conversation.snapshot()
}

#[command]
pub async fn submit_message(
    ctx: State<'_, AppContext>,
    text: String,
) -> Result<ConversationSnapshot, String> {
    let settings = ctx.settings.current();
    let outcome = ctx
        .conversation
        .submit(&text, &settings, ctx.transport.as_ref())
        .await;
    if outcome == SubmitOutcome::Ignored {
        return Err("Message was not sent".to_string());
    }
    info!("[bridge] submit settled: {:?}", outcome);
    Ok(ctx.conversation.snapshot())
}

#[command]
pub fn clear_conversation(ctx: State<'_, AppContext>) {
    ctx.conversation.clear();
}

// ============ Frontend Logging ============

#[command]
pub fn log_from_frontend(level: String, message: String) {
    match level.as_str() {
        "error" => error!("[Frontend] {}", message),
        "warn" => warn!("[Frontend] {}", message),
        _ => info!("[Frontend] {}", message),
    }
}
