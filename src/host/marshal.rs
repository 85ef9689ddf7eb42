use std::sync::Arc;

use log::trace;

use super::UiDispatcher;

/// Routes work onto the host UI thread.
///
/// Runs inline when the caller already has UI affinity, otherwise posts and
/// returns immediately. Nothing flows back to the caller: the action's outcome
/// is only observable on the UI side.
#[derive(Clone)]
pub struct ThreadMarshal {
    dispatcher: Arc<dyn UiDispatcher>,
}

impl ThreadMarshal {
    pub fn new(dispatcher: Arc<dyn UiDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn is_ui_thread(&self) -> bool {
        self.dispatcher.is_current_thread_ui()
    }

    pub fn run_on_ui_thread<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.dispatcher.is_current_thread_ui() {
            action();
            return;
        }

        trace!(
            "[ThreadMarshal] posting from {:?} to the UI thread",
            std::thread::current().id()
        );
        self.dispatcher.post_async(Box::new(action));
    }
}
