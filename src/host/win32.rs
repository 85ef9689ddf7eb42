//! Win32 window host.
//!
//! The engine surface lives in a plain `"Static"` child window created inside
//! the host's window. The host forwards its `WM_WINDOWPOSCHANGED` messages
//! through `process_host_message` so the engine follows the host's size.

use std::ffi::{OsStr, c_void};
use std::os::windows::ffi::OsStrExt;

use log::{debug, error};
use windows::Win32::Foundation::{HWND, LPARAM, RECT};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DestroyWindow, GetWindowRect, WINDOW_EX_STYLE, WINDOWPOS,
    WM_WINDOWPOSCHANGED, WS_CHILD, WS_CLIPCHILDREN, WS_VISIBLE,
};
use windows::core::PCWSTR;

use super::{NativeWindowHandle, WindowHost};
use crate::browser::WebBrowser;
use crate::constants;
use crate::error::{EmbedderError, Result};

/// Build a null-terminated UTF-16 string for Win32 APIs.
pub fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

fn to_hwnd(handle: NativeWindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

pub struct Win32WindowHost {
    class_name: Vec<u16>,
    title: Vec<u16>,
}

impl Default for Win32WindowHost {
    fn default() -> Self {
        Self {
            class_name: to_wide(constants::CHILD_WINDOW_CLASS),
            title: to_wide(""),
        }
    }
}

impl WindowHost for Win32WindowHost {
    fn create_child_window(&self, parent: NativeWindowHandle) -> Result<NativeWindowHandle> {
        let hinstance = unsafe { GetModuleHandleW(None) }.map_err(|e| {
            EmbedderError::WindowCreationFailed(format!("GetModuleHandleW failed: {e}"))
        })?;

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(self.class_name.as_ptr()),
                PCWSTR(self.title.as_ptr()),
                WS_CHILD | WS_VISIBLE | WS_CLIPCHILDREN,
                0,
                0,
                0,
                0,
                Some(to_hwnd(parent)),
                None,
                Some(hinstance.into()),
                None,
            )
        }
        .map_err(|e| {
            error!("[Win32Host] CreateWindowExW failed under {:?}: {:?}", parent, e);
            EmbedderError::WindowCreationFailed(format!("CreateWindowExW failed: {e}"))
        })?;

        debug!("[Win32Host] Child window {:?} created", hwnd);
        Ok(NativeWindowHandle(hwnd.0 as isize))
    }

    fn destroy_window(&self, window: NativeWindowHandle) -> Result<()> {
        unsafe { DestroyWindow(to_hwnd(window)) }.map_err(|e| {
            EmbedderError::WindowDestructionFailed(format!("DestroyWindow({window:?}) failed: {e}"))
        })
    }

    fn window_size(&self, window: NativeWindowHandle) -> Option<(i32, i32)> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(to_hwnd(window), &mut rect) }.ok()?;
        Some((rect.right - rect.left, rect.bottom - rect.top))
    }
}

/// Feeds a message from the host window's procedure to `browser`.
/// Returns whether the message was consumed; the host still passes it on to
/// its default handling either way.
///
/// # Safety
/// For `WM_WINDOWPOSCHANGED`, `lparam` must point to a valid `WINDOWPOS`, as
/// it does when the message comes from the system.
pub unsafe fn process_host_message(browser: &WebBrowser, msg: u32, lparam: LPARAM) -> bool {
    if msg != WM_WINDOWPOSCHANGED {
        return false;
    }
    let Some(pos) = (unsafe { (lparam.0 as *const WINDOWPOS).as_ref() }) else {
        return false;
    };
    browser.on_host_resized(pos.cx, pos.cy);
    true
}
