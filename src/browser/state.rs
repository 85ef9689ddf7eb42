//! Observable browser state mirrored from the engine.
//!
//! All fields live behind one lock so a reader never sees half of a
//! multi-field update. Mutators return the resulting change records; the
//! controller publishes them once the lock has been released.

use parking_lot::{Mutex, RwLock};

/// Who caused the address update currently being applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationOrigin {
    /// The host (or a binding) set the address; it should be navigated to.
    #[default]
    User,
    /// The engine reported where it already is; navigating again would loop.
    EngineReported,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserState {
    pub address: String,
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub tooltip_text: Option<String>,
    pub can_execute_scripts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyChanged {
    Address {
        value: String,
        origin: NavigationOrigin,
    },
    IsLoading(bool),
    CanGoBack(bool),
    CanGoForward(bool),
    TooltipText(Option<String>),
    CanExecuteScripts(bool),
}

#[derive(Debug, Default)]
pub struct ObservableState {
    values: RwLock<BrowserState>,
    origin: Mutex<NavigationOrigin>,
}

/// Restores the previous navigation origin when dropped.
#[must_use = "the origin is restored as soon as the scope is dropped"]
pub struct OriginScope<'a> {
    state: &'a ObservableState,
    previous: NavigationOrigin,
}

impl Drop for OriginScope<'_> {
    fn drop(&mut self) {
        *self.state.origin.lock() = self.previous;
    }
}

impl ObservableState {
    pub fn snapshot(&self) -> BrowserState {
        self.values.read().clone()
    }

    pub fn address(&self) -> String {
        self.values.read().address.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.values.read().is_loading
    }

    pub fn can_go_back(&self) -> bool {
        self.values.read().can_go_back
    }

    pub fn can_go_forward(&self) -> bool {
        self.values.read().can_go_forward
    }

    pub fn tooltip_text(&self) -> Option<String> {
        self.values.read().tooltip_text.clone()
    }

    pub fn can_execute_scripts(&self) -> bool {
        self.values.read().can_execute_scripts
    }

    pub fn navigation_origin(&self) -> NavigationOrigin {
        *self.origin.lock()
    }

    pub(crate) fn enter_origin(&self, origin: NavigationOrigin) -> OriginScope<'_> {
        let previous = std::mem::replace(&mut *self.origin.lock(), origin);
        OriginScope { state: self, previous }
    }

    /// Tags the change with the origin in effect when it is applied.
    pub(crate) fn set_address(&self, value: String) -> Option<PropertyChanged> {
        let origin = self.navigation_origin();
        let mut values = self.values.write();
        if values.address == value {
            return None;
        }
        values.address = value.clone();
        Some(PropertyChanged::Address { value, origin })
    }

    pub(crate) fn set_loading_state(
        &self,
        can_go_back: bool,
        can_go_forward: bool,
        is_loading: bool,
    ) -> Vec<PropertyChanged> {
        let mut changes = Vec::with_capacity(3);
        let mut values = self.values.write();
        if values.can_go_back != can_go_back {
            values.can_go_back = can_go_back;
            changes.push(PropertyChanged::CanGoBack(can_go_back));
        }
        if values.can_go_forward != can_go_forward {
            values.can_go_forward = can_go_forward;
            changes.push(PropertyChanged::CanGoForward(can_go_forward));
        }
        if values.is_loading != is_loading {
            values.is_loading = is_loading;
            changes.push(PropertyChanged::IsLoading(is_loading));
        }
        changes
    }

    pub(crate) fn set_tooltip_text(&self, text: Option<String>) -> Option<PropertyChanged> {
        let mut values = self.values.write();
        if values.tooltip_text == text {
            return None;
        }
        values.tooltip_text = text.clone();
        Some(PropertyChanged::TooltipText(text))
    }

    pub(crate) fn set_can_execute_scripts(&self, can_execute: bool) -> Option<PropertyChanged> {
        let mut values = self.values.write();
        if values.can_execute_scripts == can_execute {
            return None;
        }
        values.can_execute_scripts = can_execute;
        Some(PropertyChanged::CanExecuteScripts(can_execute))
    }
}
