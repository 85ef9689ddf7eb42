//! The browser engine as seen by the controller.
//!
//! The engine owns process management, rendering and script execution. The
//! controller only talks to it through these traits: one-time process
//! initialization, an adapter per controller that carries the creation,
//! resize and dispose requests, and the live browser handle the engine
//! reports back once its surface is attached.

pub mod callbacks;
pub mod events;
pub mod handlers;
pub mod runtime;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{BrowserSettings, EngineSettings};
use crate::host::NativeWindowHandle;

pub use callbacks::EngineCallbacks;
pub use handlers::{HandlerKind, HandlerSet};
pub use runtime::EngineRuntime;

/// Process-level engine entry point.
pub trait BrowserEngine: Send + Sync {
    /// Whether the engine was already initialized (possibly by someone else).
    fn is_initialized(&self) -> bool;

    /// One-time process initialization.
    fn initialize(&self, settings: &EngineSettings) -> anyhow::Result<()>;

    /// Creates the binding through which one controller drives one browser.
    /// `callbacks` are invoked from engine threads for the binding's lifetime.
    fn create_adapter(&self, callbacks: EngineCallbacks) -> Arc<dyn BrowserAdapter>;

    /// Tears the engine down after every browser has been disposed.
    fn shutdown(&self) {}
}

/// Mediates creation, resize and disposal requests for a single browser.
pub trait BrowserAdapter: Send + Sync {
    /// Asynchronous: completion is reported through
    /// `EngineCallbacks::after_browser_created`.
    fn create_browser(&self, request: CreateBrowserRequest);

    fn resize(&self, width: i32, height: i32);

    fn dispose(&self);
}

/// A live browser instance owned by the engine.
pub trait Browser: Send + Sync {
    fn identifier(&self) -> i32;

    /// Short-lived handle to the main frame; release it right after use.
    fn main_frame(&self) -> Box<dyn Frame + '_>;

    fn reload(&self);

    fn go_back(&self);

    fn go_forward(&self);
}

pub trait Frame {
    fn load_url(&self, url: &str);
}

/// Window styles requested for the engine-created window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInfo {
    pub parent: NativeWindowHandle,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub style: u32,
    pub ex_style: u32,
}

impl WindowInfo {
    /// Engine window filling `parent`, which it never activates.
    pub fn as_child(parent: NativeWindowHandle) -> Self {
        use crate::constants::{
            WS_CHILD, WS_CLIPCHILDREN, WS_CLIPSIBLINGS, WS_EX_NOACTIVATE, WS_TABSTOP, WS_VISIBLE,
        };

        Self {
            parent,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            style: WS_CHILD | WS_CLIPCHILDREN | WS_CLIPSIBLINGS | WS_TABSTOP | WS_VISIBLE,
            ex_style: WS_EX_NOACTIVATE,
        }
    }
}

/// Opaque request context (cookie jar, cache partition) passed through to
/// the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub cache_path: Option<std::path::PathBuf>,
    pub preferences: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct CreateBrowserRequest {
    pub window_info: WindowInfo,
    pub settings: Arc<BrowserSettings>,
    pub request_context: Option<Arc<RequestContext>>,
    pub handlers: HandlerSet,
}
