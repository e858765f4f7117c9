use activity_observer::capture::input::{Key, MouseButton, NamedKey};
use activity_observer::capture::{
    CaptureError, CaptureResult, CapturedFrame, DisplayBounds, InputHook, InputRecorder,
    ScreenSource, WindowInfo, WindowSource,
};
use activity_observer::upload::{IngestBackend, UploadError, UploadGrantRequest};
use activity_observer::{Collaborators, Observer, ObserverConfig, StartError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

#[derive(Default)]
struct FakeHook {
    recorder: Mutex<Option<InputRecorder>>,
    detaches: AtomicUsize,
}

impl FakeHook {
    fn recorder(&self) -> InputRecorder {
        self.recorder.lock().clone().expect("hook attached")
    }
}

impl InputHook for FakeHook {
    fn attach(&self, recorder: InputRecorder) -> CaptureResult<()> {
        *self.recorder.lock() = Some(recorder);
        Ok(())
    }

    fn detach(&self) {
        self.recorder.lock().take();
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }
}

struct FixedWindow;

impl WindowSource for FixedWindow {
    fn foreground_window(&self) -> CaptureResult<Option<WindowInfo>> {
        Ok(Some(WindowInfo {
            title: "Spreadsheet".to_string(),
            width: 1440,
            height: 900,
        }))
    }
}

struct NoScreens;

impl ScreenSource for NoScreens {
    fn displays(&self) -> CaptureResult<Vec<DisplayBounds>> {
        Ok(Vec::new())
    }

    fn capture(&self, _display: &DisplayBounds) -> CaptureResult<CapturedFrame> {
        Err(CaptureError::NoDisplay)
    }
}

struct AcceptingBackend;

#[async_trait]
impl IngestBackend for AcceptingBackend {
    async fn request_destination(&self, _request: &UploadGrantRequest) -> Result<String, UploadError> {
        Ok("https://ingest.test/put".to_string())
    }

    async fn transfer(&self, _upload_url: &str, _body: Vec<u8>) -> Result<(), UploadError> {
        Ok(())
    }
}

/// Grants every request and counts how often it was asked
#[derive(Default)]
struct CountingBackend {
    grants: AtomicUsize,
}

#[async_trait]
impl IngestBackend for CountingBackend {
    async fn request_destination(&self, _request: &UploadGrantRequest) -> Result<String, UploadError> {
        self.grants.fetch_add(1, Ordering::SeqCst);
        Ok("https://ingest.test/put".to_string())
    }

    async fn transfer(&self, _upload_url: &str, _body: Vec<u8>) -> Result<(), UploadError> {
        Ok(())
    }
}

struct Harness {
    observer: Arc<Observer>,
    mouse: Arc<FakeHook>,
    keyboard: Arc<FakeHook>,
}

fn config(root: &Path) -> ObserverConfig {
    ObserverConfig {
        logs_dir: root.join("logs"),
        screenshots_dir: root.join("screenshots"),
        upload_interval_secs: 3600,
        screenshot_window_secs: 3600,
        ..ObserverConfig::default()
    }
}

fn harness(config: ObserverConfig) -> Harness {
    let mouse = Arc::new(FakeHook::default());
    let keyboard = Arc::new(FakeHook::default());
    let sources = Collaborators {
        window: Arc::new(FixedWindow),
        screen: Arc::new(NoScreens),
        mouse: mouse.clone(),
        keyboard: keyboard.clone(),
        backend: Arc::new(AcceptingBackend),
    };
    Harness {
        observer: Arc::new(Observer::new(config, sources)),
        mouse,
        keyboard,
    }
}

fn records(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn records_input_until_stopped() {
    let dir = tempdir().unwrap();
    let h = harness(config(dir.path()));

    let session = h.observer.start().await.unwrap();
    assert!(h.observer.is_recording());
    assert!(session.output_file.starts_with(dir.path().join("logs")));
    assert!(dir.path().join("screenshots").is_dir());

    let keys = h.keyboard.recorder();
    let mouse = h.mouse.recorder();
    keys.on_key_press(Key::Char('h'));
    keys.on_key_press(Key::Named(NamedKey::Backspace));
    mouse.on_mouse_click(10, 20, MouseButton::Left, true);
    mouse.on_mouse_scroll(10, 20, 0, -1);

    assert_eq!(h.observer.stats().event_count, 4);

    let summary = h.observer.stop().await.expect("was recording");
    assert_eq!(summary.session_id, session.session_id);
    assert_eq!(summary.event_count, 4);
    assert!(!h.observer.is_recording());
    assert_eq!(h.mouse.detaches.load(Ordering::SeqCst), 1);
    assert_eq!(h.keyboard.detaches.load(Ordering::SeqCst), 1);

    let written = records(&summary.output_file);
    let types: Vec<_> = written
        .iter()
        .map(|r| r["event_type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, vec!["key_press", "key_press", "mouse_click", "mouse_scroll"]);
    assert!(written
        .iter()
        .all(|r| r["session_id"] == session.session_id.as_str()));
    assert_eq!(written[1]["data"]["key"], "Key.backspace");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn events_carry_polled_window_context() {
    let dir = tempdir().unwrap();
    let h = harness(config(dir.path()));
    let session = h.observer.start().await.unwrap();

    // The poller samples immediately on start
    tokio::time::sleep(Duration::from_millis(200)).await;
    h.keyboard.recorder().on_key_press(Key::Char('x'));
    h.observer.stop().await;

    let written = records(&session.output_file);
    assert_eq!(written[0]["data"]["window_title"], "Spreadsheet");
    assert_eq!(written[0]["data"]["window_width"], 1440);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_is_idempotent_and_works_from_another_task() {
    let dir = tempdir().unwrap();
    let h = harness(config(dir.path()));
    h.observer.start().await.unwrap();

    let observer = h.observer.clone();
    let first = tokio::spawn(async move { observer.stop().await })
        .await
        .unwrap();
    assert!(first.is_some());

    assert!(h.observer.stop().await.is_none());
    assert_eq!(h.keyboard.detaches.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn start_while_recording_keeps_the_session() {
    let dir = tempdir().unwrap();
    let h = harness(config(dir.path()));

    let first = h.observer.start().await.unwrap();
    let again = h.observer.start().await.unwrap();
    assert_eq!(first.session_id, again.session_id);

    h.observer.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn restart_creates_a_fresh_session() {
    let dir = tempdir().unwrap();
    let h = harness(config(dir.path()));

    let first = h.observer.start().await.unwrap();
    let stale = h.keyboard.recorder();
    stale.on_key_press(Key::Char('1'));
    h.observer.stop().await;

    let second = h.observer.start().await.unwrap();
    assert_ne!(first.session_id, second.session_id);
    assert_ne!(first.output_file, second.output_file);

    // A callback delivered through the old session's handle goes nowhere
    stale.on_key_press(Key::Char('9'));
    h.keyboard.recorder().on_key_press(Key::Char('2'));
    let summary = h.observer.stop().await.unwrap();
    assert_eq!(summary.event_count, 1);

    let written = records(&second.output_file);
    assert_eq!(written.len(), 1);
    assert_eq!(written[0]["data"]["key"], "2");
    assert_eq!(written[0]["session_id"], second.session_id.as_str());

    let old = records(&first.output_file);
    assert_eq!(old.len(), 1);
    assert_eq!(old[0]["data"]["key"], "1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn start_fails_when_log_directory_cannot_be_created() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let h = harness(ObserverConfig {
        logs_dir: blocker.join("logs"),
        ..config(dir.path())
    });

    let err = h.observer.start().await.unwrap_err();
    assert!(matches!(err, StartError::CreateDir { .. }));
    assert!(!h.observer.is_recording());
    assert!(h.observer.stats().session.is_none());
    assert!(h.mouse.recorder.lock().is_none());
    assert!(h.observer.stop().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rotation_uploads_and_switches_segments() {
    let dir = tempdir().unwrap();
    let h = harness(ObserverConfig {
        upload_interval_secs: 1,
        ..config(dir.path())
    });

    let session = h.observer.start().await.unwrap();
    h.keyboard.recorder().on_key_press(Key::Char('a'));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while h.observer.stats().segments_rotated == 0 {
        assert!(tokio::time::Instant::now() < deadline, "no rotation happened");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let current = h.observer.stats().session.unwrap().output_file;
    assert_ne!(current, session.output_file);

    h.keyboard.recorder().on_key_press(Key::Char('b'));
    let summary = h.observer.stop().await.unwrap();
    assert_eq!(summary.event_count, 2);

    let keys: Vec<_> = records(&summary.output_file)
        .iter()
        .map(|r| r["data"]["key"].as_str().unwrap().to_string())
        .collect();
    assert!(keys.contains(&"b".to_string()));
    assert!(!keys.contains(&"a".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_a_recording_observer_ends_the_session() {
    let dir = tempdir().unwrap();
    let mouse = Arc::new(FakeHook::default());
    let keyboard = Arc::new(FakeHook::default());
    let backend = Arc::new(CountingBackend::default());
    let observer = Observer::new(
        ObserverConfig {
            upload_interval_secs: 1,
            ..config(dir.path())
        },
        Collaborators {
            window: Arc::new(FixedWindow),
            screen: Arc::new(NoScreens),
            mouse: mouse.clone(),
            keyboard: keyboard.clone(),
            backend: backend.clone(),
        },
    );

    let session = observer.start().await.unwrap();
    let stale = keyboard.recorder();
    drop(observer);

    assert_eq!(mouse.detaches.load(Ordering::SeqCst), 1);
    assert_eq!(keyboard.detaches.load(Ordering::SeqCst), 1);

    // Several rotation intervals pass with no owner left
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(backend.grants.load(Ordering::SeqCst), 0);
    let segments = std::fs::read_dir(dir.path().join("logs")).unwrap().count();
    assert_eq!(segments, 1);

    stale.on_key_press(Key::Char('z'));
    assert!(records(&session.output_file).is_empty());
}
