//! Pass-through handler registrations.
//!
//! Handlers are opaque to the controller: it stores whatever the host
//! registers and hands the set to the engine with the creation request.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerKind {
    Dialog,
    Request,
    Display,
    Load,
    LifeSpan,
    Keyboard,
    JsDialog,
    Drag,
    Download,
    ContextMenu,
    Focus,
    RenderProcessMessage,
    Find,
    Audio,
    ResourceRequestFactory,
}

pub type Handler = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Default)]
pub struct HandlerSet {
    handlers: HashMap<HandlerKind, Handler>,
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("HandlerSet").field("registered", &kinds).finish()
    }
}

impl HandlerSet {
    /// Registers `handler` for `kind`, returning the one it replaces.
    pub fn set(&mut self, kind: HandlerKind, handler: Handler) -> Option<Handler> {
        self.handlers.insert(kind, handler)
    }

    pub fn remove(&mut self, kind: HandlerKind) -> Option<Handler> {
        self.handlers.remove(&kind)
    }

    pub fn get(&self, kind: HandlerKind) -> Option<&Handler> {
        self.handlers.get(&kind)
    }

    /// Typed lookup; `None` if nothing is registered or the type differs.
    pub fn get_as<T: Any + Send + Sync>(&self, kind: HandlerKind) -> Option<Arc<T>> {
        self.handlers
            .get(&kind)
            .cloned()
            .and_then(|h| h.downcast::<T>().ok())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
