//! Host-side collaborators: the native window tree the browser is parented
//! into and the UI-thread dispatcher every engine callback is funnelled through.

pub mod marshal;
pub mod queue;

#[cfg(target_os = "windows")]
pub mod win32;

use std::fmt;

use crate::error::Result;

/// Raw native window identifier (an `HWND` on Windows).
///
/// Stored as an integer so the handle is `Send + Sync` and can cross into
/// engine callbacks without a wrapper.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowHandle(pub isize);

impl NativeWindowHandle {
    pub const NULL: NativeWindowHandle = NativeWindowHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for NativeWindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeWindowHandle({:#x})", self.0)
    }
}

/// Creates and destroys the child window that hosts the engine surface.
pub trait WindowHost: Send + Sync {
    /// Creates a visible 0×0 child window at the origin of `parent` that clips
    /// its own children.
    fn create_child_window(&self, parent: NativeWindowHandle) -> Result<NativeWindowHandle>;

    /// Destroys a window previously returned by `create_child_window`.
    fn destroy_window(&self, window: NativeWindowHandle) -> Result<()>;

    /// Current outer size of `window`, if it can be queried.
    fn window_size(&self, window: NativeWindowHandle) -> Option<(i32, i32)>;
}

/// Work item posted to the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// The host's UI-thread dispatcher.
pub trait UiDispatcher: Send + Sync {
    /// Whether the calling thread owns the host's message loop.
    fn is_current_thread_ui(&self) -> bool;

    /// Schedules `task` on the UI thread and returns without waiting.
    /// Tasks posted from one thread must run in posting order.
    fn post_async(&self, task: UiTask);
}
