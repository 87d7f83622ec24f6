//! Host-to-UI notification channel for the clear-conversation shortcut

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};

type Handler = Box<dyn Fn() + Send + Sync>;

/// Holds at most one handler; registering again replaces it.
#[derive(Default)]
pub struct ClearSignal {
    handler: Mutex<Option<Handler>>,
}

impl ClearSignal {
    pub fn register(&self, handler: impl Fn() + Send + Sync + 'static) {
        if self.lock().replace(Box::new(handler)).is_some() {
            warn!("[clear-signal] replaced an existing handler");
        }
    }

    pub fn unregister(&self) {
        if self.lock().take().is_some() {
            info!("[clear-signal] handler torn down");
        }
    }

    /// Runs the handler if one is registered; returns whether it ran
    pub fn fire(&self) -> bool {
        let guard = self.lock();
        match guard.as_ref() {
            Some(handler) => {
                handler();
                true
            }
            None => {
                info!("[clear-signal] fired with no handler");
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Handler>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn fire_without_handler_does_nothing() {
        let signal = ClearSignal::default();
        assert!(!signal.fire());
    }

    #[test]
    fn registered_handler_runs_on_each_fire() {
        let signal = ClearSignal::default();
        let (count, handler) = counter();
        signal.register(handler);

        assert!(signal.fire());
        assert!(signal.fire());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn register_replaces_previous_handler() {
        let signal = ClearSignal::default();
        let (first, first_handler) = counter();
        let (second, second_handler) = counter();
        signal.register(first_handler);
        signal.register(second_handler);

        signal.fire();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregister_tears_down_handler() {
        let signal = ClearSignal::default();
        let (count, handler) = counter();
        signal.register(handler);
        signal.unregister();

        assert!(!signal.fire());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
