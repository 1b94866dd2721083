use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionId;

/// Point-in-time view of a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier
    pub id: SessionId,

    /// Whether the capture task is still pulling chunks
    pub is_recording: bool,

    /// When the recording started
    pub started_at: DateTime<Utc>,

    /// Elapsed wall-clock time since start, in milliseconds
    pub duration_ms: i64,

    /// PCM bytes captured so far
    pub bytes_captured: usize,

    /// Level of the most recent chunk (0.0 to 1.0)
    pub current_level: f64,

    /// Device failure that ended capture early, if any
    pub last_error: Option<String>,
}
