use std::path::PathBuf;

use crate::session::SessionId;

/// Failures reported by a capture device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device could not be opened with the requested format.
    #[error("failed to open capture device: {0}")]
    Open(String),

    /// An open device failed while delivering a chunk.
    #[error("capture device read failed: {0}")]
    Read(String),
}

/// Errors surfaced by the session registry.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// No session was created; the device never opened.
    #[error(transparent)]
    DeviceOpen(DeviceError),

    /// The id was never issued or the session was already removed.
    #[error("recording {0} not found")]
    NotFound(SessionId),

    /// The WAV file could not be created or fully written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The capture task panicked or was cancelled before it could be joined.
    #[error("capture task for recording {id} failed: {reason}")]
    CaptureTaskFailed { id: SessionId, reason: String },
}

pub type Result<T, E = RecorderError> = std::result::Result<T, E>;
