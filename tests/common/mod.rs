#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicIsize, AtomicUsize, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use cef_host_embedder::config::EngineSettings;
use cef_host_embedder::engine::{
    Browser, BrowserAdapter, BrowserEngine, CreateBrowserRequest, EngineCallbacks, EngineRuntime,
    Frame,
};
use cef_host_embedder::error::{EmbedderError, Result};
use cef_host_embedder::host::queue::UiThreadQueue;
use cef_host_embedder::{NativeWindowHandle, WebBrowser, WindowHost};

pub type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockEngine {
    pub init_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    pub adapters: Mutex<Vec<Arc<MockAdapter>>>,
    /// Runs inside `initialize`.
    pub on_initialize: Mutex<Option<Hook>>,
}

impl MockEngine {
    pub fn adapter(&self) -> Arc<MockAdapter> {
        self.adapters.lock().last().cloned().expect("no adapter created")
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.lock().len()
    }
}

impl BrowserEngine for MockEngine {
    fn is_initialized(&self) -> bool {
        false
    }

    fn initialize(&self, _settings: &EngineSettings) -> anyhow::Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.on_initialize.lock().as_ref() {
            hook();
        }
        Ok(())
    }

    fn create_adapter(&self, callbacks: EngineCallbacks) -> Arc<dyn BrowserAdapter> {
        let adapter = Arc::new(MockAdapter {
            callbacks,
            requests: Mutex::new(Vec::new()),
            resizes: Mutex::new(Vec::new()),
            dispose_calls: AtomicUsize::new(0),
            next_browser_id: AtomicI32::new(1),
            on_dispose: Mutex::new(None),
        });
        self.adapters.lock().push(adapter.clone());
        adapter
    }

    fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockAdapter {
    pub callbacks: EngineCallbacks,
    pub requests: Mutex<Vec<CreateBrowserRequest>>,
    pub resizes: Mutex<Vec<(i32, i32)>>,
    pub dispose_calls: AtomicUsize,
    next_browser_id: AtomicI32,
    pub on_dispose: Mutex<Option<Arc<dyn Fn() + Send + Sync>>>,
}

impl MockAdapter {
    /// Reports the requested browser as created, as the engine would from
    /// one of its own threads.
    pub fn complete_creation(&self) -> Arc<MockBrowser> {
        let browser = Arc::new(MockBrowser::new(
            self.next_browser_id.fetch_add(1, Ordering::SeqCst),
        ));
        self.callbacks.after_browser_created(browser.clone());
        browser
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl BrowserAdapter for MockAdapter {
    fn create_browser(&self, request: CreateBrowserRequest) {
        self.requests.lock().push(request);
    }

    fn resize(&self, width: i32, height: i32) {
        self.resizes.lock().push((width, height));
    }

    fn dispose(&self) {
        self.dispose_calls.fetch_add(1, Ordering::SeqCst);
        let hook = self.on_dispose.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

pub struct MockBrowser {
    pub id: i32,
    pub loads: Mutex<Vec<String>>,
    pub open_frames: AtomicIsize,
    pub reloads: AtomicUsize,
    pub backs: AtomicUsize,
    pub forwards: AtomicUsize,
}

impl MockBrowser {
    fn new(id: i32) -> Self {
        Self {
            id,
            loads: Mutex::new(Vec::new()),
            open_frames: AtomicIsize::new(0),
            reloads: AtomicUsize::new(0),
            backs: AtomicUsize::new(0),
            forwards: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }
}

pub struct MockFrame<'a> {
    browser: &'a MockBrowser,
}

impl Frame for MockFrame<'_> {
    fn load_url(&self, url: &str) {
        self.browser.loads.lock().push(url.to_string());
    }
}

impl Drop for MockFrame<'_> {
    fn drop(&mut self) {
        self.browser.open_frames.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Browser for MockBrowser {
    fn identifier(&self) -> i32 {
        self.id
    }

    fn main_frame(&self) -> Box<dyn Frame + '_> {
        self.open_frames.fetch_add(1, Ordering::SeqCst);
        Box::new(MockFrame { browser: self })
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    fn go_back(&self) {
        self.backs.fetch_add(1, Ordering::SeqCst);
    }

    fn go_forward(&self) {
        self.forwards.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockWindowHost {
    next_handle: AtomicIsize,
    pub created: Mutex<Vec<(NativeWindowHandle, NativeWindowHandle)>>,
    pub destroyed: Mutex<Vec<NativeWindowHandle>>,
    pub destroyed_on: Mutex<Vec<ThreadId>>,
    pub size: Mutex<Option<(i32, i32)>>,
    pub fail_creation: AtomicBool,
}

impl Default for MockWindowHost {
    fn default() -> Self {
        Self {
            next_handle: AtomicIsize::new(0x1000),
            created: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            destroyed_on: Mutex::new(Vec::new()),
            size: Mutex::new(None),
            fail_creation: AtomicBool::new(false),
        }
    }
}

impl MockWindowHost {
    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }
}

impl WindowHost for MockWindowHost {
    fn create_child_window(&self, parent: NativeWindowHandle) -> Result<NativeWindowHandle> {
        if self.fail_creation.load(Ordering::SeqCst) {
            return Err(EmbedderError::WindowCreationFailed("mock refused".into()));
        }
        let child = NativeWindowHandle(self.next_handle.fetch_add(0x10, Ordering::SeqCst));
        self.created.lock().push((parent, child));
        Ok(child)
    }

    fn destroy_window(&self, window: NativeWindowHandle) -> Result<()> {
        self.destroyed.lock().push(window);
        self.destroyed_on.lock().push(thread::current().id());
        Ok(())
    }

    fn window_size(&self, _window: NativeWindowHandle) -> Option<(i32, i32)> {
        *self.size.lock()
    }
}

pub const HOST_WINDOW: NativeWindowHandle = NativeWindowHandle(0x42);

pub struct Harness {
    pub browser: Arc<WebBrowser>,
    pub engine: Arc<MockEngine>,
    pub host: Arc<MockWindowHost>,
    pub queue: Arc<UiThreadQueue>,
    pub runtime: Arc<EngineRuntime>,
}

impl Harness {
    /// Controller whose UI thread is the calling (test) thread.
    pub fn new() -> Self {
        let runtime = Arc::new(EngineRuntime::new(EngineSettings::default()));
        Self::with_runtime(runtime)
    }

    pub fn with_runtime(runtime: Arc<EngineRuntime>) -> Self {
        let engine = Arc::new(MockEngine::default());
        let host = Arc::new(MockWindowHost::default());
        let queue = UiThreadQueue::bound_to_current_thread();
        let browser = WebBrowser::builder(engine.clone(), host.clone(), queue.clone())
            .runtime(runtime.clone())
            .build();
        Self { browser, engine, host, queue, runtime }
    }

    /// Attaches and reports the browser as created on the UI thread.
    pub fn attached(self) -> (Self, Arc<MockBrowser>) {
        self.browser.attach(HOST_WINDOW).unwrap();
        let created = self.engine.adapter().complete_creation();
        self.queue.run_pending();
        (self, created)
    }
}
