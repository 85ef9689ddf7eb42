mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;

use cef_host_embedder::config::EngineSettings;
use cef_host_embedder::engine::EngineRuntime;
use cef_host_embedder::EmbedderError;
use parking_lot::Mutex;

use common::{HOST_WINDOW, Harness};

#[test]
fn concurrent_dispose_tears_down_once() {
    let (h, _created) = Harness::new().attached();
    let child = h.browser.child_window().unwrap();

    let barrier = Arc::new(Barrier::new(16));
    let workers: Vec<_> = (0..16)
        .map(|_| {
            let browser = h.browser.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                browser.dispose();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    h.browser.dispose();
    h.queue.run_pending();

    assert!(h.browser.is_disposed());
    assert!(!h.browser.is_browser_initialized());
    assert_eq!(h.engine.adapter().dispose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*h.host.destroyed.lock(), vec![child]);
    assert_eq!(*h.host.destroyed_on.lock(), vec![thread::current().id()]);
}

#[test]
fn dispose_off_the_ui_thread_destroys_the_window_on_the_ui_thread() {
    let (h, _created) = Harness::new().attached();
    let ui_thread = thread::current().id();
    let child = h.browser.child_window().unwrap();

    let browser = h.browser.clone();
    thread::spawn(move || browser.dispose()).join().unwrap();

    assert!(h.host.destroyed.lock().is_empty());
    assert_eq!(h.browser.child_window(), None);

    h.queue.run_pending();

    assert_eq!(*h.host.destroyed.lock(), vec![child]);
    assert_eq!(*h.host.destroyed_on.lock(), vec![ui_thread]);

    // Nothing left for a later detach to destroy.
    h.browser.detach().unwrap();
    assert_eq!(h.host.destroyed.lock().len(), 1);
}

#[test]
fn last_drop_on_an_engine_thread_destroys_the_window_on_the_ui_thread() {
    let (h, _created) = Harness::new().attached();
    let ui_thread = thread::current().id();
    let Harness { browser, host, queue, engine, .. } = h;

    thread::spawn(move || drop(browser)).join().unwrap();
    assert_eq!(engine.adapter().dispose_calls.load(Ordering::SeqCst), 1);
    assert!(host.destroyed.lock().is_empty());

    queue.run_pending();

    assert_eq!(host.destroyed.lock().len(), 1);
    assert_eq!(*host.destroyed_on.lock(), vec![ui_thread]);
}

#[test]
fn teardown_clears_the_handle_then_disposes_the_adapter_then_destroys_the_window() {
    let (h, _created) = Harness::new().attached();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let weak = Arc::downgrade(&h.browser);
    let host = h.host.clone();
    let s = seen.clone();
    *h.engine.adapter().on_dispose.lock() = Some(Arc::new(move || {
        let handle_cleared = weak.upgrade().map(|b| !b.is_browser_initialized());
        let window_alive = host.destroyed.lock().is_empty();
        s.lock().push((handle_cleared, window_alive));
    }));

    h.browser.dispose();

    assert_eq!(*seen.lock(), vec![(Some(true), true)]);
    assert_eq!(h.host.destroyed.lock().len(), 1);
}

#[test]
fn creation_racing_dispose_never_leaves_a_handle_behind() {
    for _ in 0..100 {
        let h = Harness::new();
        h.browser.attach(HOST_WINDOW).unwrap();
        let adapter = h.engine.adapter();

        let barrier = Arc::new(Barrier::new(2));
        let b = barrier.clone();
        let engine_thread = thread::spawn(move || {
            b.wait();
            adapter.complete_creation()
        });
        barrier.wait();
        h.browser.dispose();
        engine_thread.join().unwrap();
        h.queue.run_pending();

        assert!(h.browser.is_disposed());
        assert!(!h.browser.is_browser_initialized());
        assert!(h.browser.browser().is_none());
    }
}

#[test]
fn engine_initialization_can_call_back_into_the_controller() {
    let h = Harness::new();
    let results = Arc::new(Mutex::new(Vec::new()));

    let weak = Arc::downgrade(&h.browser);
    let r = results.clone();
    *h.engine.on_initialize.lock() = Some(Box::new(move || {
        if let Some(b) = weak.upgrade() {
            r.lock().push(b.detach().is_ok());
        }
    }));

    h.browser.attach(HOST_WINDOW).unwrap();

    assert_eq!(*results.lock(), vec![true]);
    assert_eq!(h.engine.adapter_count(), 1);
}

#[test]
fn detach_waits_for_the_adapter() {
    let (h, _created) = Harness::new().attached();

    let err = h.browser.detach().unwrap_err();
    assert!(matches!(err, EmbedderError::AdapterStillAlive));
    assert!(h.host.destroyed.lock().is_empty());

    h.browser.dispose();
    h.browser.detach().unwrap();

    // Dispose already destroyed the window; detach has nothing left to do.
    assert_eq!(h.host.destroyed.lock().len(), 1);
}

#[test]
fn attach_after_dispose_is_rejected() {
    let h = Harness::new();
    h.browser.dispose();

    let err = h.browser.attach(HOST_WINDOW).unwrap_err();

    assert!(matches!(err, EmbedderError::Disposed));
    assert_eq!(h.host.created_count(), 0);
    assert_eq!(h.engine.adapter_count(), 0);
}

#[test]
fn late_creation_after_dispose_is_ignored() {
    let h = Harness::new();
    h.browser.set_address("http://a");
    h.browser.attach(HOST_WINDOW).unwrap();
    let adapter = h.engine.adapter();

    h.browser.dispose();
    let created = adapter.complete_creation();
    h.queue.run_pending();

    assert!(!h.browser.is_browser_initialized());
    assert!(created.loads().is_empty());
}

#[test]
fn resize_after_dispose_is_dropped() {
    let (h, _created) = Harness::new().attached();
    h.browser.dispose();

    h.browser.on_host_resized(100, 100);

    assert!(h.engine.adapter().resizes.lock().is_empty());
}

#[test]
fn engine_initializes_once_per_runtime() {
    let runtime = Arc::new(EngineRuntime::new(EngineSettings::default()));
    let first = Harness::with_runtime(runtime.clone());
    let second = Harness::with_runtime(runtime.clone());

    first.browser.attach(HOST_WINDOW).unwrap();
    second.browser.attach(HOST_WINDOW).unwrap();

    assert_eq!(first.engine.init_calls.load(Ordering::SeqCst), 1);
    // Already initialized through the first controller's engine.
    assert_eq!(second.engine.init_calls.load(Ordering::SeqCst), 0);
    assert!(runtime.is_initialized());
    assert_eq!(runtime.live_count(), 2);
}

#[test]
fn runtime_shutdown_disposes_live_browsers() {
    let runtime = Arc::new(EngineRuntime::new(EngineSettings::default()));
    let (first, _a) = Harness::with_runtime(runtime.clone()).attached();
    let (second, _b) = Harness::with_runtime(runtime.clone()).attached();
    second.browser.dispose();
    assert_eq!(runtime.live_count(), 1);

    runtime.shutdown();

    assert!(first.browser.is_disposed());
    assert_eq!(first.engine.adapter().dispose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.engine.adapter().dispose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.engine.shutdown_calls.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.live_count(), 0);
}

#[test]
fn dropping_the_controller_disposes_it() {
    let (h, _created) = Harness::new().attached();
    let adapter = h.engine.adapter();
    let host = h.host.clone();
    let runtime = h.runtime.clone();

    drop(h);

    assert_eq!(adapter.dispose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(host.destroyed.lock().len(), 1);
    assert_eq!(runtime.live_count(), 0);
}
