//! Global keyboard shortcuts

use log::{error, info};
use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::{
    Code, GlobalShortcutExt, Modifiers, Shortcut, ShortcutEvent, ShortcutState,
};

use crate::context::AppContext;
use crate::window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    ToggleVisibility,
    ClearConversation,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 2] = [
        ShortcutAction::ToggleVisibility,
        ShortcutAction::ClearConversation,
    ];

    pub fn shortcut(self) -> Shortcut {
        let code = match self {
            ShortcutAction::ToggleVisibility => Code::KeyH,
            ShortcutAction::ClearConversation => Code::KeyQ,
        };
        Shortcut::new(Some(primary_modifier() | Modifiers::SHIFT), code)
    }

    pub fn from_shortcut(shortcut: &Shortcut) -> Option<Self> {
        Self::ALL.into_iter().find(|action| {
            let expected = action.shortcut();
            shortcut.matches(expected.mods, expected.key)
        })
    }
}

/// Command on macOS, Control elsewhere
fn primary_modifier() -> Modifiers {
    if cfg!(target_os = "macos") {
        Modifiers::SUPER
    } else {
        Modifiers::CONTROL
    }
}

/// Registration failures are logged; the window stays usable without them.
pub fn register_all(app: &AppHandle) {
    for action in ShortcutAction::ALL {
        match app.global_shortcut().register(action.shortcut()) {
            Ok(()) => info!("[shortcut] registered {:?}", action),
            Err(e) => error!("[shortcut] failed to register {:?}: {}", action, e),
        }
    }
}

pub fn unregister_all(app: &AppHandle) {
    if let Err(e) = app.global_shortcut().unregister_all() {
        error!("[shortcut] failed to unregister shortcuts: {}", e);
    }
}

pub fn handle(app: &AppHandle, shortcut: &Shortcut, event: ShortcutEvent) {
    if !matches!(event.state(), ShortcutState::Pressed) {
        return;
    }
    match ShortcutAction::from_shortcut(shortcut) {
        Some(ShortcutAction::ToggleVisibility) => match window::toggle_visibility(app) {
            Ok(visible) => info!("[shortcut] toggled visibility -> {}", visible),
            Err(e) => error!("[shortcut] toggle failed: {}", e),
        },
        Some(ShortcutAction::ClearConversation) => {
            app.state::<AppContext>().clear_signal.fire();
        }
        None => info!("[shortcut] ignored unknown shortcut {:?}", shortcut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_action_round_trips_through_its_shortcut() {
        for action in ShortcutAction::ALL {
            assert_eq!(ShortcutAction::from_shortcut(&action.shortcut()), Some(action));
        }
    }

    #[test]
    fn shortcuts_require_shift() {
        let without_shift = Shortcut::new(Some(primary_modifier()), Code::KeyH);
        assert_eq!(ShortcutAction::from_shortcut(&without_shift), None);
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let other = Shortcut::new(Some(primary_modifier() | Modifiers::SHIFT), Code::KeyX);
        assert_eq!(ShortcutAction::from_shortcut(&other), None);
    }
}
