use super::session::RecordingSession;
use super::stats::SessionStats;
use super::SessionId;
use crate::audio::{write_wav, CaptureBackend, FormatSpec, CHUNK_SIZE};
use crate::error::{RecorderError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Table of recording sessions, keyed by id.
///
/// The table lock only guards the map itself. It is never held across a
/// device call, a capture-task join, or a buffer copy; those go through the
/// session's own locks after its `Arc` has been cloned out of the table.
pub struct SessionRegistry {
    backend: Arc<dyn CaptureBackend>,
    spec: FormatSpec,
    chunk_size: usize,
    sessions: RwLock<BTreeMap<SessionId, Arc<RecordingSession>>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Registry recording 16-bit stereo 44.1kHz in 4096-byte chunks
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        info!("Session registry using {} capture backend", backend.name());

        Self {
            backend,
            spec: FormatSpec::CD_STEREO,
            chunk_size: CHUNK_SIZE,
            sessions: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn format(&self) -> FormatSpec {
        self.spec
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Open a device and start capturing into a new session.
    ///
    /// Nothing is registered and no id is consumed if the device fails to open.
    pub async fn start(&self) -> Result<SessionId> {
        info!("Starting recording");

        let device = self.backend.open(&self.spec).map_err(|e| {
            error!("Failed to start recording: {}", e);
            RecorderError::DeviceOpen(e)
        })?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let session = Arc::new(RecordingSession::start(id, device, self.chunk_size));

        // If this future is dropped while waiting for the table, the session
        // drops with it and releases the device
        self.sessions.write().await.insert(id, session);

        info!("Recording started with id {}", id);
        Ok(id)
    }

    /// Stop a session and wait until its capture task has exited.
    ///
    /// The session stays registered, so it can still be saved. Stopping it
    /// again succeeds.
    pub async fn stop(&self, id: SessionId) -> Result<()> {
        let session = self.get(id).await?;
        session.stop().await
    }

    /// Level of one still-recording session, or 0.0 if none is recording.
    ///
    /// With several sessions running this reports the lowest id. Use
    /// `session_level` to ask about a specific session.
    pub async fn current_level(&self) -> f64 {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .find(|session| session.is_recording())
            .map(|session| session.current_level())
            .unwrap_or(0.0)
    }

    pub async fn session_level(&self, id: SessionId) -> Result<f64> {
        Ok(self.get(id).await?.current_level())
    }

    /// Milliseconds since the session started
    pub async fn duration_ms(&self, id: SessionId) -> Result<i64> {
        Ok(self.get(id).await?.duration_ms())
    }

    pub async fn stats(&self, id: SessionId) -> Result<SessionStats> {
        Ok(self.get(id).await?.stats().await)
    }

    /// Stats for every registered session, ordered by id
    pub async fn list(&self) -> Vec<SessionStats> {
        let sessions: Vec<_> = self.sessions.read().await.values().cloned().collect();

        let mut stats = Vec::with_capacity(sessions.len());
        for session in sessions {
            stats.push(session.stats().await);
        }
        stats
    }

    /// Write everything captured so far to `path` as WAV, then drop the session.
    ///
    /// Saving does not wait for a stop: the file holds the bytes captured up to
    /// this call. If capture was still running, it is torn down after the
    /// session has been removed so the device is released. When two saves of
    /// the same session overlap, only the one that removes it succeeds; the
    /// other reports `NotFound`.
    pub async fn save(&self, id: SessionId, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let session = self.get(id).await?;

        info!("Saving recording {} to {}", id, path.display());

        let pcm = session.snapshot().await;
        write_wav(path, &pcm, &self.spec)?;

        let session = self.sessions.write().await.remove(&id).ok_or_else(|| {
            warn!("Recording {} was removed while being saved", id);
            RecorderError::NotFound(id)
        })?;

        if session.is_recording() {
            warn!("Recording {} saved while still capturing; stopping it", id);
        }
        // Dropping this future mid-stop leaves the session to release the
        // device when its last handle goes away
        if let Err(e) = session.stop().await {
            error!("Failed to release recording {} after save: {}", id, e);
        }

        info!("Recording {} saved: {} bytes of PCM", id, pcm.len());
        Ok(())
    }

    /// Stop a session and remove it without writing anything
    pub async fn discard(&self, id: SessionId) -> Result<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(RecorderError::NotFound(id))?;

        info!("Discarding recording {}", id);
        session.stop().await
    }

    /// Stop and remove every session
    pub async fn shutdown(&self) {
        let sessions = std::mem::take(&mut *self.sessions.write().await);

        if !sessions.is_empty() {
            info!("Shutting down {} recording(s)", sessions.len());
        }

        for (id, session) in sessions {
            if let Err(e) = session.stop().await {
                error!("Failed to stop recording {} during shutdown: {}", id, e);
            }
        }
    }

    async fn get(&self, id: SessionId) -> Result<Arc<RecordingSession>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RecorderError::NotFound(id))
    }
}
