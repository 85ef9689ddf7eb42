//! The embedding controller.
//!
//! `WebBrowser` owns the native child window the engine renders into, the
//! adapter that carries creation/resize/dispose requests to the engine, and
//! the browser handle the engine reports back. Engine callbacks arrive on
//! engine threads; everything that touches observable state is marshalled
//! to the host UI thread first.
//!
//! Lifecycle:
//! 1. `attach(host)`: one-time engine init, adapter creation, child window
//!    creation, then the asynchronous browser creation request.
//! 2. Engine reports `after_browser_created`: the handle is stored, the
//!    current address (if any) is navigated to once, the child window size is
//!    pushed to the engine.
//! 3. `dispose()`: handle released, adapter disposed, child window destroyed
//!    (on the UI thread, posted there if needed).

pub mod relay;
pub mod signals;
pub mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use log::{debug, info, trace, warn};
use parking_lot::{Mutex, RwLock};

use crate::config::BrowserSettings;
use crate::engine::events::{
    AddressChangedEvent, ConsoleMessageEvent, FrameLoadEndEvent, FrameLoadStartEvent,
    JavascriptMessageEvent, LoadErrorEvent, LoadingStateChangedEvent, StatusMessageEvent,
    TitleChangedEvent,
};
use crate::engine::handlers::Handler;
use crate::engine::runtime::{Disposable, DisposableId};
use crate::engine::{
    Browser, BrowserAdapter, BrowserEngine, CreateBrowserRequest, EngineCallbacks,
    EngineRuntime, HandlerKind, HandlerSet, RequestContext, WindowInfo,
};
use crate::error::{EmbedderError, Result};
use crate::host::marshal::ThreadMarshal;
use crate::host::{NativeWindowHandle, UiDispatcher, WindowHost};

use relay::EventRelay;
use signals::Signal;
use state::{BrowserState, NavigationOrigin, ObservableState, PropertyChanged};

/// Browser settings plus who is responsible for releasing them.
#[derive(Debug, Default)]
struct SettingsSlot {
    settings: Option<Arc<BrowserSettings>>,
    /// Defaulted by the controller rather than supplied by the caller.
    owned: bool,
}

pub struct WebBrowserBuilder {
    engine: Arc<dyn BrowserEngine>,
    window_host: Arc<dyn WindowHost>,
    dispatcher: Arc<dyn UiDispatcher>,
    runtime: Option<Arc<EngineRuntime>>,
    settings: Option<Arc<BrowserSettings>>,
    request_context: Option<Arc<RequestContext>>,
    handlers: HandlerSet,
}

impl WebBrowserBuilder {
    /// Uses `runtime` instead of the process-wide one.
    pub fn runtime(mut self, runtime: Arc<EngineRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Caller-owned settings; the controller never releases them.
    pub fn browser_settings(mut self, settings: Arc<BrowserSettings>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn request_context(mut self, context: Arc<RequestContext>) -> Self {
        self.request_context = Some(context);
        self
    }

    pub fn handler(mut self, kind: HandlerKind, handler: Handler) -> Self {
        self.handlers.set(kind, handler);
        self
    }

    pub fn build(self) -> Arc<WebBrowser> {
        Arc::new_cyclic(|this| WebBrowser {
            this: this.clone(),
            engine: self.engine,
            runtime: self.runtime.unwrap_or_else(EngineRuntime::global),
            window_host: self.window_host,
            marshal: ThreadMarshal::new(self.dispatcher),
            state: ObservableState::default(),
            events: EventRelay::new(),
            child_window: Mutex::new(None),
            adapter: RwLock::new(None),
            browser: RwLock::new(None),
            settings: Mutex::new(SettingsSlot { settings: self.settings, owned: false }),
            request_context: RwLock::new(self.request_context),
            handlers: RwLock::new(self.handlers),
            creation_requested: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            registration: Mutex::new(None),
        })
    }
}

pub struct WebBrowser {
    this: Weak<WebBrowser>,
    engine: Arc<dyn BrowserEngine>,
    runtime: Arc<EngineRuntime>,
    window_host: Arc<dyn WindowHost>,
    marshal: ThreadMarshal,
    state: ObservableState,
    events: EventRelay,
    child_window: Mutex<Option<NativeWindowHandle>>,
    adapter: RwLock<Option<Arc<dyn BrowserAdapter>>>,
    browser: RwLock<Option<Arc<dyn Browser>>>,
    settings: Mutex<SettingsSlot>,
    request_context: RwLock<Option<Arc<RequestContext>>>,
    handlers: RwLock<HandlerSet>,
    creation_requested: AtomicBool,
    disposed: AtomicBool,
    registration: Mutex<Option<DisposableId>>,
}

impl std::fmt::Debug for WebBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebBrowser")
            .field("child_window", &*self.child_window.lock())
            .field("browser_initialized", &self.is_browser_initialized())
            .field("disposed", &self.is_disposed())
            .field("state", &self.state.snapshot())
            .finish()
    }
}

/// Wraps a controller method as an engine callback that holds only a weak
/// reference, so a late callback after the controller is gone does nothing.
fn forward<T, F>(this: &Weak<WebBrowser>, handler: F) -> impl Fn(T) + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&WebBrowser, T) + Send + Sync + 'static,
{
    let this = this.clone();
    move |payload| {
        if let Some(browser) = this.upgrade() {
            handler(&browser, payload);
        }
    }
}

impl WebBrowser {
    pub fn builder(
        engine: Arc<dyn BrowserEngine>,
        window_host: Arc<dyn WindowHost>,
        dispatcher: Arc<dyn UiDispatcher>,
    ) -> WebBrowserBuilder {
        WebBrowserBuilder {
            engine,
            window_host,
            dispatcher,
            runtime: None,
            settings: None,
            request_context: None,
            handlers: HandlerSet::default(),
        }
    }

    // ------------------------------------------------------------------
    // Embedding
    // ------------------------------------------------------------------

    /// Creates (once) the child window under `host` and requests the browser.
    /// Later calls return the existing child window.
    pub fn attach(&self, host: NativeWindowHandle) -> Result<NativeWindowHandle> {
        if self.is_disposed() {
            return Err(EmbedderError::Disposed);
        }

        let adapter = self.initialize()?;

        let child = {
            let mut child_window = self.child_window.lock();
            match *child_window {
                Some(existing) => existing,
                None => {
                    let created = self.window_host.create_child_window(host)?;
                    info!("[WebBrowser] Created child window {:?} under {:?}", created, host);
                    *child_window = Some(created);
                    created
                }
            }
        };

        if !self.creation_requested.swap(true, Ordering::AcqRel) {
            let request = CreateBrowserRequest {
                window_info: WindowInfo::as_child(child),
                settings: self.settings_for_request(),
                request_context: self.request_context.read().clone(),
                handlers: self.handlers.read().clone(),
            };
            debug!("[WebBrowser] Requesting browser creation: {:?}", request.window_info);
            adapter.create_browser(request);
        }

        Ok(child)
    }

    /// Adapter for this controller, creating it (and initializing the engine)
    /// on first use.
    fn initialize(&self) -> Result<Arc<dyn BrowserAdapter>> {
        if let Some(adapter) = self.adapter.read().clone() {
            return Ok(adapter);
        }

        // Guarded by the runtime; no controller lock is held while the
        // engine initializes.
        self.runtime.ensure_initialized(&self.engine)?;

        // The slot stays locked across `create_adapter` so concurrent
        // attaches end up with a single adapter.
        let mut adapter_slot = self.adapter.write();
        if let Some(adapter) = adapter_slot.as_ref() {
            return Ok(adapter.clone());
        }

        let tracked: Weak<dyn Disposable> = self.this.clone();
        *self.registration.lock() = Some(self.runtime.track(tracked));

        {
            let mut slot = self.settings.lock();
            if slot.settings.is_none() {
                slot.settings = Some(Arc::new(BrowserSettings::default()));
                slot.owned = true;
            }
        }

        let adapter = self.engine.create_adapter(self.engine_callbacks());
        *adapter_slot = Some(adapter.clone());
        info!("[WebBrowser] Adapter created");
        Ok(adapter)
    }

    /// Settings the controller defaulted move into the request; caller-owned
    /// settings are shared and stay with the caller.
    fn settings_for_request(&self) -> Arc<BrowserSettings> {
        let mut slot = self.settings.lock();
        if slot.owned {
            slot.owned = false;
            slot.settings.take().unwrap_or_default()
        } else {
            slot.settings.clone().unwrap_or_default()
        }
    }

    fn engine_callbacks(&self) -> EngineCallbacks {
        let this = &self.this;
        EngineCallbacks::new()
            .on_after_browser_created(forward(this, |b, browser| b.on_after_browser_created(browser)))
            .on_address_changed(forward(this, |b, ev: AddressChangedEvent| {
                b.on_address_reported(ev.address)
            }))
            .on_title_changed(forward(this, |b, ev| b.on_title_reported(ev)))
            .on_loading_state_changed(forward(this, |b, ev| b.on_loading_state_reported(ev)))
            .on_tooltip_changed(forward(this, |b, text| b.on_tooltip_reported(text)))
            .on_can_execute_javascript_changed(forward(this, |b, can| {
                b.on_can_execute_scripts_reported(can)
            }))
            .on_console_message(forward(this, |b, ev| b.on_console_message(ev)))
            .on_status_message(forward(this, |b, ev| b.on_status_message(ev)))
            .on_frame_load_start(forward(this, |b, ev| b.on_frame_load_start(ev)))
            .on_frame_load_end(forward(this, |b, ev| b.on_frame_load_end(ev)))
            .on_load_error(forward(this, |b, ev| b.on_load_error(ev)))
            .on_javascript_message_received(forward(this, |b, ev| {
                b.on_javascript_message_received(ev)
            }))
    }

    /// Forwards a host size change. Dropped while no browser exists: the
    /// engine is given the window's current size once it attaches.
    pub fn on_host_resized(&self, width: i32, height: i32) {
        if self.browser.read().is_none() {
            trace!("[WebBrowser] Dropping resize {}x{}: no browser yet", width, height);
            return;
        }
        let adapter = self.adapter.read().clone();
        if let Some(adapter) = adapter {
            adapter.resize(width, height);
        }
    }

    /// Destroys the child window. The adapter must be gone first.
    pub fn detach(&self) -> Result<()> {
        if self.adapter.read().is_some() {
            warn!("[WebBrowser] detach called while the adapter is alive");
            return Err(EmbedderError::AdapterStillAlive);
        }
        self.destroy_child_window()
    }

    fn destroy_child_window(&self) -> Result<()> {
        let window = self.child_window.lock().take();
        if let Some(window) = window {
            self.window_host.destroy_window(window)?;
            info!("[WebBrowser] Destroyed child window {:?}", window);
        }
        Ok(())
    }

    /// Releases the browser, disposes the adapter and destroys the child
    /// window. Only the first call does anything.
    pub fn dispose(&self) {
        if self
            .disposed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        if let Some(id) = self.registration.lock().take() {
            self.runtime.untrack(id);
        }

        self.browser.write().take();

        let adapter = self.adapter.write().take();
        if let Some(adapter) = adapter {
            adapter.dispose();
            debug!("[WebBrowser] Adapter disposed");
        }

        {
            let mut slot = self.settings.lock();
            if slot.owned {
                slot.settings = None;
                slot.owned = false;
            }
        }

        self.destroy_child_window_on_ui_thread();
        info!("[WebBrowser] Disposed");
    }

    /// Native windows can only be destroyed by the thread that created them.
    /// Off the UI thread the destroy is posted; the task holds the host, not
    /// the controller, which may already be dropping.
    fn destroy_child_window_on_ui_thread(&self) {
        if self.marshal.is_ui_thread() {
            if let Err(e) = self.destroy_child_window() {
                warn!("[WebBrowser] {}", e);
            }
            return;
        }

        let Some(window) = self.child_window.lock().take() else {
            return;
        };
        let window_host = self.window_host.clone();
        debug!("[WebBrowser] Posting destruction of {:?} to the UI thread", window);
        self.marshal.run_on_ui_thread(move || match window_host.destroy_window(window) {
            Ok(()) => info!("[WebBrowser] Destroyed child window {:?}", window),
            Err(e) => warn!("[WebBrowser] {}", e),
        });
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn browser_settings(&self) -> Option<Arc<BrowserSettings>> {
        self.settings.lock().settings.clone()
    }

    /// Fails once the browser exists; the current settings are kept.
    pub fn set_browser_settings(&self, settings: Arc<BrowserSettings>) -> Result<()> {
        if self.browser.read().is_some() {
            warn!("[WebBrowser] Rejecting browser settings: browser already created");
            return Err(EmbedderError::BrowserAlreadyCreated);
        }
        *self.settings.lock() = SettingsSlot { settings: Some(settings), owned: false };
        Ok(())
    }

    pub fn request_context(&self) -> Option<Arc<RequestContext>> {
        self.request_context.read().clone()
    }

    pub fn set_request_context(&self, context: Option<Arc<RequestContext>>) {
        *self.request_context.write() = context;
    }

    pub fn handler(&self, kind: HandlerKind) -> Option<Handler> {
        self.handlers.read().get(kind).cloned()
    }

    pub fn set_handler(&self, kind: HandlerKind, handler: Option<Handler>) -> Option<Handler> {
        let mut handlers = self.handlers.write();
        match handler {
            Some(handler) => handlers.set(kind, handler),
            None => handlers.remove(kind),
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Navigates the main frame. Does nothing until the browser exists.
    pub fn load(&self, url: &str) {
        let browser = self.browser.read().clone();
        let Some(browser) = browser else {
            trace!("[WebBrowser] Ignoring load({}): no browser yet", url);
            return;
        };
        let frame = browser.main_frame();
        frame.load_url(url);
    }

    pub fn refresh(&self) {
        if let Some(browser) = self.browser() {
            browser.reload();
        }
    }

    pub fn go_back(&self) {
        if let Some(browser) = self.browser() {
            browser.go_back();
        }
    }

    pub fn go_forward(&self) {
        if let Some(browser) = self.browser() {
            browser.go_forward();
        }
    }

    /// Sets the address property as the host. Applied on the UI thread; the
    /// new address is navigated to unless an engine report is in progress.
    pub fn set_address(&self, address: impl Into<String>) {
        let address = address.into();
        let this = self.this.clone();
        self.marshal.run_on_ui_thread(move || {
            if let Some(browser) = this.upgrade() {
                if let Some(change) = browser.state.set_address(address) {
                    browser.publish(change);
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // Observable state
    // ------------------------------------------------------------------

    pub fn state(&self) -> &ObservableState {
        &self.state
    }

    pub fn snapshot(&self) -> BrowserState {
        self.state.snapshot()
    }

    pub fn address(&self) -> String {
        self.state.address()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn can_go_back(&self) -> bool {
        self.state.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.state.can_go_forward()
    }

    pub fn tooltip_text(&self) -> Option<String> {
        self.state.tooltip_text()
    }

    pub fn can_execute_scripts(&self) -> bool {
        self.state.can_execute_scripts()
    }

    pub fn navigation_origin(&self) -> NavigationOrigin {
        self.state.navigation_origin()
    }

    pub fn events(&self) -> &EventRelay {
        &self.events
    }

    pub fn browser(&self) -> Option<Arc<dyn Browser>> {
        self.browser.read().clone()
    }

    pub fn is_browser_initialized(&self) -> bool {
        self.browser.read().is_some()
    }

    pub fn child_window(&self) -> Option<NativeWindowHandle> {
        *self.child_window.lock()
    }

    /// Runs on the UI thread, so the controller's own address reaction runs
    /// before external subscribers see the change.
    fn publish(&self, change: PropertyChanged) {
        if let PropertyChanged::Address { value, origin } = &change {
            self.on_address_changed(value, *origin);
        }
        self.events.property_changed.emit(&change);
    }

    fn on_address_changed(&self, address: &str, origin: NavigationOrigin) {
        if origin == NavigationOrigin::EngineReported
            || self.state.navigation_origin() == NavigationOrigin::EngineReported
        {
            trace!("[WebBrowser] Address {} reported by engine; not navigating", address);
            return;
        }
        self.load(address);
    }

    // ------------------------------------------------------------------
    // Engine callbacks (any thread)
    // ------------------------------------------------------------------

    pub fn on_after_browser_created(&self, browser: Arc<dyn Browser>) {
        {
            // `dispose` raises the flag before clearing this slot, so checking
            // it under the lock leaves no window for a stale store.
            let mut slot = self.browser.write();
            if self.is_disposed() {
                debug!("[WebBrowser] Browser created after dispose; ignoring");
                return;
            }
            *slot = Some(browser.clone());
        }
        info!("[WebBrowser] Browser {} created", browser.identifier());

        let this = self.this.clone();
        self.marshal.run_on_ui_thread(move || {
            if let Some(b) = this.upgrade() {
                let address = b.state.address();
                if !address.is_empty() {
                    debug!("[WebBrowser] Replaying pending address {}", address);
                    b.load(&address);
                }
            }
        });

        let child = *self.child_window.lock();
        let size = child.and_then(|w| self.window_host.window_size(w));
        if let Some((width, height)) = size {
            self.on_host_resized(width, height);
        }

        self.events.after_browser_created.emit(&browser);
    }

    pub fn on_address_reported(&self, address: String) {
        let this = self.this.clone();
        self.marshal.run_on_ui_thread(move || {
            if let Some(b) = this.upgrade() {
                let _origin = b.state.enter_origin(NavigationOrigin::EngineReported);
                if let Some(change) = b.state.set_address(address) {
                    b.publish(change);
                }
            }
        });
    }

    pub fn on_loading_state_reported(&self, event: LoadingStateChangedEvent) {
        let this = self.this.clone();
        self.marshal.run_on_ui_thread(move || {
            if let Some(b) = this.upgrade() {
                let changes = b.state.set_loading_state(
                    event.can_go_back,
                    event.can_go_forward,
                    event.is_loading,
                );
                for change in changes {
                    b.publish(change);
                }
                b.events.loading_state_changed.emit(&event);
            }
        });
    }

    pub fn on_tooltip_reported(&self, text: Option<String>) {
        let this = self.this.clone();
        self.marshal.run_on_ui_thread(move || {
            if let Some(b) = this.upgrade() {
                if let Some(change) = b.state.set_tooltip_text(text) {
                    b.publish(change);
                }
            }
        });
    }

    pub fn on_can_execute_scripts_reported(&self, can_execute: bool) {
        let this = self.this.clone();
        self.marshal.run_on_ui_thread(move || {
            if let Some(b) = this.upgrade() {
                if let Some(change) = b.state.set_can_execute_scripts(can_execute) {
                    b.publish(change);
                }
            }
        });
    }

    pub fn on_title_reported(&self, event: TitleChangedEvent) {
        trace!("[WebBrowser] Title reported: {}", event.title);
    }

    pub fn on_console_message(&self, event: ConsoleMessageEvent) {
        self.relay(|e| &e.console_message, event);
    }

    pub fn on_status_message(&self, event: StatusMessageEvent) {
        self.relay(|e| &e.status_message, event);
    }

    pub fn on_frame_load_start(&self, event: FrameLoadStartEvent) {
        self.relay(|e| &e.frame_load_start, event);
    }

    pub fn on_frame_load_end(&self, event: FrameLoadEndEvent) {
        self.relay(|e| &e.frame_load_end, event);
    }

    pub fn on_load_error(&self, event: LoadErrorEvent) {
        debug!(
            "[WebBrowser] Load error {} ({}) for {}",
            event.error_code, event.error_text, event.failed_url
        );
        self.relay(|e| &e.load_error, event);
    }

    /// Delivered on the calling engine thread.
    pub fn on_javascript_message_received(&self, event: JavascriptMessageEvent) {
        self.events.javascript_message_received.emit(&event);
    }

    fn relay<T>(&self, signal: fn(&EventRelay) -> &Signal<T>, payload: T)
    where
        T: Send + 'static,
    {
        let this = self.this.clone();
        self.marshal.run_on_ui_thread(move || {
            if let Some(b) = this.upgrade() {
                signal(&b.events).emit(&payload);
            }
        });
    }
}

impl Disposable for WebBrowser {
    fn dispose(&self) {
        WebBrowser::dispose(self);
    }
}

impl Drop for WebBrowser {
    fn drop(&mut self) {
        WebBrowser::dispose(self);
    }
}
