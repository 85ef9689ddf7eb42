//! Hosts a browser engine's native window inside a host application's window
//! tree and mirrors the engine's state into the host's UI thread.
//!
//! - `browser::WebBrowser` owns the child window, the engine adapter and the
//!   browser handle, and exposes navigation commands
//! - engine callbacks (any thread) are marshalled to the UI thread before they
//!   touch observable state or reach host subscribers
//! - `engine` holds the traits an engine binding implements; `host` holds the
//!   window host and UI dispatcher traits plus ready-made implementations

pub mod browser;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod host;

pub use browser::state::{BrowserState, NavigationOrigin, PropertyChanged};
pub use browser::{WebBrowser, WebBrowserBuilder};
pub use config::{BrowserSettings, EngineSettings};
pub use error::{EmbedderError, Result};
pub use host::{NativeWindowHandle, UiDispatcher, WindowHost};

use std::sync::Once;

use env_logger::{Builder, Env};

// Several hosts may create controllers in one process; the logger can only be
// installed once.
static LOGGER_INIT: Once = Once::new();

pub fn init_logging() {
    LOGGER_INIT.call_once(|| {
        // A host that installed its own logger keeps it.
        let _ = Builder::from_env(Env::default().default_filter_or(constants::DEFAULT_LOG_FILTER))
            .try_init();
    });
}
