/// Window class used for the child window that hosts the engine surface.
pub const CHILD_WINDOW_CLASS: &str = "Static";

/// Default `env_logger` filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "debug";

// Win32 window styles, kept as plain integers so engine requests can carry
// them on every platform.
pub const WS_CHILD: u32 = 0x4000_0000;
pub const WS_VISIBLE: u32 = 0x1000_0000;
pub const WS_CLIPSIBLINGS: u32 = 0x0400_0000;
pub const WS_CLIPCHILDREN: u32 = 0x0200_0000;
pub const WS_TABSTOP: u32 = 0x0001_0000;

/// Extended style: the engine window never takes activation from the host.
pub const WS_EX_NOACTIVATE: u32 = 0x0800_0000;
