//! Process-wide engine state: the one-time initialization guard and the
//! registry of live controllers that must be disposed before the engine
//! shuts down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use log::{debug, info, warn};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;

use super::BrowserEngine;
use crate::config::EngineSettings;
use crate::error::{EmbedderError, Result};

/// Something the runtime must tear down before the engine goes away.
pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisposableId(u64);

static GLOBAL_RUNTIME: Lazy<Arc<EngineRuntime>> =
    Lazy::new(|| Arc::new(EngineRuntime::new(EngineSettings::default())));

pub struct EngineRuntime {
    initialized: OnceCell<()>,
    settings: Mutex<EngineSettings>,
    engine: Mutex<Option<Arc<dyn BrowserEngine>>>,
    tracked: Mutex<HashMap<DisposableId, Weak<dyn Disposable>>>,
    next_id: AtomicU64,
}

impl EngineRuntime {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            initialized: OnceCell::new(),
            settings: Mutex::new(settings),
            engine: Mutex::new(None),
            tracked: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The runtime shared by every controller that was not given its own.
    pub fn global() -> Arc<EngineRuntime> {
        GLOBAL_RUNTIME.clone()
    }

    /// Replaces the settings used for initialization. Returns `false` (and
    /// changes nothing) once the engine has been initialized.
    pub fn configure(&self, settings: EngineSettings) -> bool {
        if self.is_initialized() {
            warn!("[EngineRuntime] Engine already initialized; ignoring new settings");
            return false;
        }
        *self.settings.lock() = settings;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    /// Initializes `engine` at most once for this runtime. Concurrent callers
    /// wait for the first one; an engine that reports itself initialized is
    /// adopted as is. A failed attempt leaves the guard unset.
    pub fn ensure_initialized(&self, engine: &Arc<dyn BrowserEngine>) -> Result<()> {
        self.initialized
            .get_or_try_init(|| -> Result<()> {
                crate::init_logging();
                if engine.is_initialized() {
                    info!("[EngineRuntime] Engine was initialized elsewhere; adopting it");
                } else {
                    let settings = self.settings.lock().clone();
                    info!(
                        "[EngineRuntime] Initializing engine (locale={}, cache={:?})",
                        settings.locale, settings.cache_path
                    );
                    engine
                        .initialize(&settings)
                        .map_err(EmbedderError::EngineInitialization)?;
                }
                *self.engine.lock() = Some(engine.clone());
                Ok(())
            })
            .map(|_| ())
    }

    pub fn track(&self, item: Weak<dyn Disposable>) -> DisposableId {
        let id = DisposableId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.tracked.lock().insert(id, item);
        debug!("[EngineRuntime] Tracking disposable {:?}", id);
        id
    }

    pub fn untrack(&self, id: DisposableId) -> bool {
        self.tracked.lock().remove(&id).is_some()
    }

    /// Number of tracked items that are still alive.
    pub fn live_count(&self) -> usize {
        self.tracked
            .lock()
            .values()
            .filter(|item| item.strong_count() > 0)
            .count()
    }

    /// Disposes every tracked item, then shuts the engine down.
    pub fn shutdown(&self) {
        let items: Vec<_> = self.tracked.lock().drain().collect();
        info!("[EngineRuntime] Shutting down; {} tracked item(s)", items.len());

        for (id, item) in items {
            match item.upgrade() {
                Some(item) => item.dispose(),
                None => debug!("[EngineRuntime] {:?} already dropped", id),
            }
        }

        if let Some(engine) = self.engine.lock().take() {
            engine.shutdown();
        }
    }
}
