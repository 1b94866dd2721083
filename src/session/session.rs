use super::capture::spawn_capture;
use super::stats::SessionStats;
use super::SessionId;
use crate::audio::{compute_level, CaptureDevice};
use crate::error::{RecorderError, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// State shared between a session and its capture task.
///
/// The capture task is the only writer of `buffer` and `current_level`;
/// control operations only read them.
pub(crate) struct CaptureState {
    id: SessionId,

    /// Cleared exactly once, by a stop request or by a device failure
    is_recording: AtomicBool,

    /// Level of the latest chunk, stored as `f64` bits
    current_level: AtomicU64,

    /// Captured PCM bytes, append-only while recording
    buffer: Mutex<Vec<u8>>,

    /// Device failure that ended capture early
    last_error: Mutex<Option<String>>,
}

impl CaptureState {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            is_recording: AtomicBool::new(true),
            current_level: AtomicU64::new(0f64.to_bits()),
            buffer: Mutex::new(Vec::new()),
            last_error: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    pub(crate) fn current_level(&self) -> f64 {
        f64::from_bits(self.current_level.load(Ordering::SeqCst))
    }

    /// Append a chunk read by the capture task.
    ///
    /// Called from the blocking capture thread.
    pub(crate) fn append_chunk(&self, chunk: &[u8]) -> usize {
        self.current_level
            .store(compute_level(chunk).to_bits(), Ordering::SeqCst);

        let mut buffer = self.buffer.blocking_lock();
        buffer.extend_from_slice(chunk);
        buffer.len()
    }

    /// Record a device failure. Returns false if a stop was already requested.
    ///
    /// Called from the blocking capture thread.
    pub(crate) fn fail(&self, reason: String) -> bool {
        // Locked first so a reader that sees the flag cleared also sees the error
        let mut last_error = self.last_error.blocking_lock();
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            return false;
        }
        *last_error = Some(reason);
        true
    }

    /// Returns true if this call is the one that cleared the flag
    fn request_stop(&self) -> bool {
        self.is_recording.swap(false, Ordering::SeqCst)
    }
}

/// One recording: its growing PCM buffer, live level, and capture task.
///
/// Owned by the `SessionRegistry`. Dropping a session whose capture task was
/// never joined stops the task and closes its device in the background.
pub struct RecordingSession {
    state: Arc<CaptureState>,

    /// Wall-clock start, for display
    started_at: DateTime<Utc>,

    /// Monotonic start, for durations
    started: Instant,

    /// Capture task; yields the device back when it exits
    capture_task: Mutex<Option<JoinHandle<Box<dyn CaptureDevice>>>>,
}

impl RecordingSession {
    /// Create a session and start pulling chunks from `device` on the
    /// blocking pool.
    pub(crate) fn start(id: SessionId, device: Box<dyn CaptureDevice>, chunk_size: usize) -> Self {
        let state = Arc::new(CaptureState::new(id));
        let task = spawn_capture(Arc::clone(&state), device, chunk_size);

        Self {
            state,
            started_at: Utc::now(),
            started: Instant::now(),
            capture_task: Mutex::new(Some(task)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.state.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    pub fn current_level(&self) -> f64 {
        self.state.current_level()
    }

    /// Milliseconds elapsed since the session started.
    ///
    /// Measured on the monotonic clock, so it never goes backwards when the
    /// system time is adjusted.
    pub fn duration_ms(&self) -> i64 {
        i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    /// Copy of everything captured up to this instant
    pub async fn snapshot(&self) -> Vec<u8> {
        self.state.buffer.lock().await.clone()
    }

    pub async fn bytes_captured(&self) -> usize {
        self.state.buffer.lock().await.len()
    }

    pub async fn stats(&self) -> SessionStats {
        SessionStats {
            id: self.id(),
            is_recording: self.is_recording(),
            started_at: self.started_at,
            duration_ms: self.duration_ms(),
            bytes_captured: self.bytes_captured().await,
            current_level: self.current_level(),
            last_error: self.state.last_error.lock().await.clone(),
        }
    }

    /// Stop capturing, wait for the capture task to exit, and close the device.
    ///
    /// Once this returns the buffer no longer changes. Stopping an already
    /// stopped session succeeds without doing anything. If the returned
    /// future is dropped before it completes, the capture task stays attached
    /// and the next `stop` (or dropping the session) finishes the job.
    pub async fn stop(&self) -> Result<()> {
        let id = self.id();
        if self.state.request_stop() {
            info!("Stopping recording {}", id);
        }

        // Held across the join so concurrent stops wait for the first one
        let mut capture_task = self.capture_task.lock().await;
        let Some(task) = capture_task.as_mut() else {
            debug!("Recording {} already stopped", id);
            return Ok(());
        };

        let joined = task.await;
        *capture_task = None;

        match joined {
            Ok(device) => device.close(),
            Err(e) => {
                error!("Capture task for recording {} failed: {}", id, e);
                return Err(RecorderError::CaptureTaskFailed {
                    id,
                    reason: e.to_string(),
                });
            }
        }

        let bytes = self.bytes_captured().await;
        if let Some(reason) = self.state.last_error.lock().await.as_deref() {
            warn!(
                "Recording {} stopped after device failure ({}): {} bytes kept",
                id, reason, bytes
            );
        } else {
            info!("Recording {} stopped: {} bytes captured", id, bytes);
        }

        Ok(())
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        let Some(task) = self.capture_task.get_mut().take() else {
            return;
        };

        let id = self.state.id;
        if self.state.request_stop() {
            warn!("Recording {} dropped while capturing", id);
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    match task.await {
                        Ok(device) => {
                            device.close();
                            debug!("Released device of dropped recording {}", id);
                        }
                        Err(e) => error!("Capture task for recording {} failed: {}", id, e),
                    }
                });
            }
            Err(_) => warn!(
                "Recording {} dropped outside a runtime; its device is not closed",
                id
            ),
        }
    }
}
