//! Error types for the embedding controller.

#[derive(Debug)]
pub enum EmbedderError {
    /// The engine's process-wide initialization failed.
    EngineInitialization(anyhow::Error),
    /// The native child window could not be created.
    WindowCreationFailed(String),
    /// A native window could not be destroyed.
    WindowDestructionFailed(String),
    /// Browser settings can no longer change once the browser exists.
    BrowserAlreadyCreated,
    /// The adapter must be disposed before the child window goes away.
    AdapterStillAlive,
    /// The controller has already been disposed.
    Disposed,
}

impl std::fmt::Display for EmbedderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedderError::EngineInitialization(e) => {
                write!(f, "Engine initialization failed: {:#}", e)
            }
            EmbedderError::WindowCreationFailed(s) => {
                write!(f, "Child window creation failed: {}", s)
            }
            EmbedderError::WindowDestructionFailed(s) => {
                write!(f, "Window destruction failed: {}", s)
            }
            EmbedderError::BrowserAlreadyCreated => write!(
                f,
                "Browser has been created; browser settings can no longer be changed."
            ),
            EmbedderError::AdapterStillAlive => write!(
                f,
                "Browser adapter is still alive; dispose the browser before destroying its window."
            ),
            EmbedderError::Disposed => write!(f, "Browser has been disposed."),
        }
    }
}

impl std::error::Error for EmbedderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmbedderError::EngineInitialization(e) => Some(&**e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EmbedderError>;
