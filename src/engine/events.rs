//! Payloads the engine reports through its callbacks.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressChangedEvent {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleChangedEvent {
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingStateChangedEvent {
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Verbose,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessageEvent {
    pub level: ConsoleLevel,
    pub message: String,
    pub source: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessageEvent {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLoadStartEvent {
    pub url: String,
    pub is_main_frame: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLoadEndEvent {
    pub url: String,
    pub is_main_frame: bool,
    pub http_status_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadErrorEvent {
    pub failed_url: String,
    /// Engine-specific network error code (negative for network failures).
    pub error_code: i32,
    pub error_text: String,
    pub is_main_frame: bool,
}

/// A message posted from page script to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct JavascriptMessageEvent {
    pub frame_url: String,
    pub message: Value,
}
