use std::sync::Arc;

use super::signals::Signal;
use super::state::PropertyChanged;
use crate::engine::Browser;
use crate::engine::events::{
    ConsoleMessageEvent, FrameLoadEndEvent, FrameLoadStartEvent, JavascriptMessageEvent,
    LoadErrorEvent, LoadingStateChangedEvent, StatusMessageEvent,
};

/// The signals a `WebBrowser` re-emits to the host.
///
/// Everything is delivered on the UI thread except `javascript_message_received`
/// and `after_browser_created`, which fire on the engine thread that reported them.
#[derive(Debug)]
pub struct EventRelay {
    pub frame_load_start: Signal<FrameLoadStartEvent>,
    pub frame_load_end: Signal<FrameLoadEndEvent>,
    pub load_error: Signal<LoadErrorEvent>,
    pub console_message: Signal<ConsoleMessageEvent>,
    pub status_message: Signal<StatusMessageEvent>,
    pub loading_state_changed: Signal<LoadingStateChangedEvent>,
    pub javascript_message_received: Signal<JavascriptMessageEvent>,
    pub after_browser_created: Signal<Arc<dyn Browser>>,
    pub property_changed: Signal<PropertyChanged>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self {
            frame_load_start: Signal::new("frame_load_start"),
            frame_load_end: Signal::new("frame_load_end"),
            load_error: Signal::new("load_error"),
            console_message: Signal::new("console_message"),
            status_message: Signal::new("status_message"),
            loading_state_changed: Signal::new("loading_state_changed"),
            javascript_message_received: Signal::new("javascript_message_received"),
            after_browser_created: Signal::new("after_browser_created"),
            property_changed: Signal::new("property_changed"),
        }
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}
