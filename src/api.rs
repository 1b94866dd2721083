//! Integer-coded control surface
//!
//! Mirrors the registry operations with the plain return conventions used by
//! foreign callers: ids and durations as `i64`, status as `i32`, failures as
//! negative codes. Errors are logged here before they are flattened.

use crate::error::RecorderError;
use crate::session::{SessionId, SessionRegistry};
use tracing::warn;

pub const OK: i32 = 0;
pub const ERR_NOT_FOUND: i32 = -1;
pub const ERR_DEVICE: i32 = -2;
pub const ERR_IO: i32 = -3;
pub const ERR_CAPTURE_TASK: i32 = -4;

/// Negative status code for an error
pub fn error_code(err: &RecorderError) -> i32 {
    match err {
        RecorderError::NotFound(_) => ERR_NOT_FOUND,
        RecorderError::DeviceOpen(_) => ERR_DEVICE,
        RecorderError::Io { .. } => ERR_IO,
        RecorderError::CaptureTaskFailed { .. } => ERR_CAPTURE_TASK,
    }
}

fn status(result: Result<(), RecorderError>) -> i32 {
    match result {
        Ok(()) => OK,
        Err(e) => {
            warn!("{}", e);
            error_code(&e)
        }
    }
}

/// Ids below 1 were never issued
fn session_id(id: i64) -> Option<SessionId> {
    SessionId::try_from(id).ok().filter(|id| *id > 0)
}

/// Positive id on success, negative code on failure
pub async fn start_recording(registry: &SessionRegistry) -> i64 {
    match registry.start().await {
        Ok(id) => id as i64,
        Err(e) => {
            warn!("{}", e);
            error_code(&e) as i64
        }
    }
}

pub async fn stop_recording(registry: &SessionRegistry, id: i64) -> i32 {
    match session_id(id) {
        Some(id) => status(registry.stop(id).await),
        None => ERR_NOT_FOUND,
    }
}

/// Level of one of the running sessions, 0.0 if nothing is recording
pub async fn get_current_level(registry: &SessionRegistry) -> f64 {
    registry.current_level().await
}

pub async fn save_recording(registry: &SessionRegistry, id: i64, path: &str) -> i32 {
    match session_id(id) {
        Some(id) => status(registry.save(id, path).await),
        None => ERR_NOT_FOUND,
    }
}

/// Elapsed milliseconds; 0 for an unknown id
pub async fn get_recording_duration(registry: &SessionRegistry, id: i64) -> i64 {
    match session_id(id) {
        Some(id) => registry.duration_ms(id).await.unwrap_or(0),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeviceError;

    #[test]
    fn test_error_codes_are_distinct_and_negative() {
        let codes = [
            error_code(&RecorderError::NotFound(7)),
            error_code(&RecorderError::DeviceOpen(DeviceError::Open("busy".into()))),
            error_code(&RecorderError::Io {
                path: "out.wav".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }),
            error_code(&RecorderError::CaptureTaskFailed {
                id: 7,
                reason: "panicked".into(),
            }),
        ];

        assert!(codes.iter().all(|code| *code < 0));
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_non_positive_ids_are_never_valid() {
        assert_eq!(session_id(0), None);
        assert_eq!(session_id(-5), None);
        assert_eq!(session_id(3), Some(3));
    }
}
