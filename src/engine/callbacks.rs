//! Typed callback registrations the engine invokes.
//!
//! One slot per event kind. The controller fills the slots it cares about;
//! the engine calls every slot unconditionally and empty slots do nothing.
//! Callbacks may be invoked from any engine thread.

use std::fmt;
use std::sync::Arc;

use super::Browser;
use super::events::{
    AddressChangedEvent, ConsoleMessageEvent, FrameLoadEndEvent, FrameLoadStartEvent,
    JavascriptMessageEvent, LoadErrorEvent, LoadingStateChangedEvent, StatusMessageEvent,
    TitleChangedEvent,
};

pub type Callback<T> = Box<dyn Fn(T) + Send + Sync + 'static>;

macro_rules! engine_callbacks {
    ($($(#[$doc:meta])* $name:ident / $register:ident : $payload:ty;)*) => {
        #[derive(Default)]
        pub struct EngineCallbacks {
            $($name: Option<Callback<$payload>>,)*
        }

        impl EngineCallbacks {
            pub fn new() -> Self {
                Self::default()
            }

            $(
                pub fn $register<F>(mut self, callback: F) -> Self
                where
                    F: Fn($payload) + Send + Sync + 'static,
                {
                    self.$name = Some(Box::new(callback));
                    self
                }

                $(#[$doc])*
                pub fn $name(&self, payload: $payload) {
                    if let Some(callback) = &self.$name {
                        callback(payload);
                    }
                }
            )*

            fn registered(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(if self.$name.is_some() { names.push(stringify!($name)); })*
                names
            }
        }
    };
}

engine_callbacks! {
    /// The browser requested through `create_browser` now exists.
    after_browser_created / on_after_browser_created: Arc<dyn Browser>;
    /// Main-frame navigation committed or redirected.
    address_changed / on_address_changed: AddressChangedEvent;
    title_changed / on_title_changed: TitleChangedEvent;
    loading_state_changed / on_loading_state_changed: LoadingStateChangedEvent;
    tooltip_changed / on_tooltip_changed: Option<String>;
    /// The main frame's script context was created (`true`) or released (`false`).
    can_execute_javascript_changed / on_can_execute_javascript_changed: bool;
    console_message / on_console_message: ConsoleMessageEvent;
    status_message / on_status_message: StatusMessageEvent;
    frame_load_start / on_frame_load_start: FrameLoadStartEvent;
    frame_load_end / on_frame_load_end: FrameLoadEndEvent;
    load_error / on_load_error: LoadErrorEvent;
    javascript_message_received / on_javascript_message_received: JavascriptMessageEvent;
}

impl fmt::Debug for EngineCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCallbacks")
            .field("registered", &self.registered())
            .finish()
    }
}
