//! Application context shared by commands, shortcuts and window hooks

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::ChatTransport;
use crate::conversation::Conversation;
use crate::events::ClearSignal;
use crate::settings::SettingsStore;

pub struct AppContext {
    pub settings: SettingsStore,
    pub conversation: Conversation,
    pub transport: Arc<dyn ChatTransport>,
    pub clear_signal: ClearSignal,
    visible: AtomicBool,
}

impl AppContext {
    pub fn new(
        settings: SettingsStore,
        conversation: Conversation,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            settings,
            conversation,
            transport,
            clear_signal: ClearSignal::default(),
            visible: AtomicBool::new(true),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}
