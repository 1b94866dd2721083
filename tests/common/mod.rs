// Scripted capture backend for integration tests
//
// Every open() creates a device fed through a channel. The test pushes chunks
// into device N and the capture loop receives them one read at a time.
// Disconnecting a device makes its next read fail.

#![allow(dead_code)]

use session_recorder::{CaptureBackend, CaptureDevice, DeviceError, FormatSpec, SessionId, SessionRegistry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CHUNK: usize = 4096;

#[derive(Default)]
pub struct FeedBackend {
    feeds: Mutex<Vec<Option<Sender<Vec<u8>>>>>,
    closed: Arc<AtomicUsize>,
    refuse_open: AtomicBool,
}

impl FeedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Backend whose devices never open
    pub fn unavailable() -> Arc<Self> {
        let backend = Self::default();
        backend.refuse_open.store(true, Ordering::SeqCst);
        Arc::new(backend)
    }

    /// Deliver one chunk to the device opened `device`-th (0-based)
    pub fn push(&self, device: usize, chunk: Vec<u8>) {
        let feeds = self.feeds.lock().unwrap();
        if let Some(Some(tx)) = feeds.get(device) {
            tx.send(chunk).unwrap();
        }
    }

    /// Make the device's pending and future reads fail
    pub fn disconnect(&self, device: usize) {
        let mut feeds = self.feeds.lock().unwrap();
        if let Some(feed) = feeds.get_mut(device) {
            feed.take();
        }
    }

    pub fn opened(&self) -> usize {
        self.feeds.lock().unwrap().len()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl CaptureBackend for FeedBackend {
    fn open(&self, _spec: &FormatSpec) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        if self.refuse_open.load(Ordering::SeqCst) {
            return Err(DeviceError::Open("no capture device".to_string()));
        }

        let (tx, rx) = channel();
        self.feeds.lock().unwrap().push(Some(tx));

        Ok(Box::new(FeedDevice {
            rx,
            closed: Arc::clone(&self.closed),
        }))
    }

    fn name(&self) -> &str {
        "feed"
    }
}

struct FeedDevice {
    rx: Receiver<Vec<u8>>,
    closed: Arc<AtomicUsize>,
}

impl CaptureDevice for FeedDevice {
    fn read_chunk(&mut self, _size: usize) -> Result<Vec<u8>, DeviceError> {
        self.rx
            .recv()
            .map_err(|_| DeviceError::Read("device disconnected".to_string()))
    }

    fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// PCM chunk filled with one repeated sample
pub fn tone_chunk(sample: i16) -> Vec<u8> {
    sample.to_le_bytes().repeat(CHUNK / 2)
}

/// Poll until the session has captured at least `bytes`
pub async fn wait_for_bytes(registry: &SessionRegistry, id: SessionId, bytes: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let captured = registry.stats(id).await.unwrap().bytes_captured;
        if captured >= bytes {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {} bytes (have {})",
            bytes,
            captured
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll until the capture task has cleared the recording flag
pub async fn wait_until_stopped(registry: &SessionRegistry, id: SessionId) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while registry.stats(id).await.unwrap().is_recording {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for recording {} to stop",
            id
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll until `count` devices have been closed
pub async fn wait_for_closed(backend: &FeedBackend, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while backend.closed() < count {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {} closed devices (have {})",
            count,
            backend.closed()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
