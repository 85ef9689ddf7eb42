//! Configuration handed through to the engine.
//!
//! Neither struct is interpreted here: `EngineSettings` goes to the engine's
//! one-time process initialization, `BrowserSettings` to each browser
//! creation request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tri-state switch used by the engine: unset values keep the engine default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureState {
    #[default]
    Default,
    Enabled,
    Disabled,
}

/// Per-browser settings. Immutable once the browser has been created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub default_encoding: Option<String>,
    pub javascript: FeatureState,
    pub javascript_access_clipboard: FeatureState,
    pub image_loading: FeatureState,
    pub local_storage: FeatureState,
    pub web_security: FeatureState,
    /// ARGB background color painted before the first frame.
    pub background_color: u32,
    pub windowless_frame_rate: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            default_encoding: None,
            javascript: FeatureState::Default,
            javascript_access_clipboard: FeatureState::Default,
            image_loading: FeatureState::Default,
            local_storage: FeatureState::Default,
            web_security: FeatureState::Default,
            background_color: 0xFFFF_FFFF,
            windowless_frame_rate: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Verbose,
    #[default]
    Info,
    Warning,
    Error,
    Disable,
}

/// Process-wide engine settings, used once by the first controller that
/// attaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub cache_path: Option<PathBuf>,
    pub locale: String,
    pub user_agent: Option<String>,
    pub log_severity: LogSeverity,
    pub log_file: Option<PathBuf>,
    pub remote_debugging_port: Option<u16>,
    pub multi_threaded_message_loop: bool,
    pub command_line_switches: BTreeMap<String, Option<String>>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cache_path: None,
            locale: "en-US".to_string(),
            user_agent: None,
            log_severity: LogSeverity::Info,
            log_file: None,
            remote_debugging_port: None,
            multi_threaded_message_loop: true,
            command_line_switches: BTreeMap::new(),
        }
    }
}

impl EngineSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing engine settings")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine settings from {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("invalid engine settings in {}", path.display()))
    }

    /// Adds `--name[=value]` to the engine command line.
    pub fn with_switch(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.command_line_switches
            .insert(name.into(), value.map(str::to_string));
        self
    }
}

impl BrowserSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing browser settings")
    }
}
