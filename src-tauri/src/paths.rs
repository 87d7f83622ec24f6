//! Path utilities and window geometry constants

use std::path::PathBuf;

/// Directory name under the platform data dir
pub const APP_DIR_NAME: &str = "com.overlaychat.desktop";

/// Settings file name inside the application data directory
pub const SETTINGS_FILE_NAME: &str = "config.json";

/// Default overlay window dimensions
pub const DEFAULT_WINDOW_WIDTH: f64 = 400.0;
pub const DEFAULT_WINDOW_HEIGHT: f64 = 600.0;

/// Gap kept between the window and the right/top edges of the work area
pub const WINDOW_EDGE_MARGIN: f64 = 20.0;

/// Gets the application data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|p| p.join(APP_DIR_NAME))
        .ok_or_else(|| "Could not find app data directory".to_string())
}

/// Gets the settings file path
pub fn get_settings_path() -> Result<PathBuf, String> {
    get_app_data_dir().map(|p| p.join(SETTINGS_FILE_NAME))
}
