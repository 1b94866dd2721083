use super::session::CaptureState;
use crate::audio::CaptureDevice;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Spawn the capture loop for a session on the blocking pool.
///
/// The loop owns `device` while it runs and hands it back through the join
/// handle, so whoever joins the task is the one that closes it.
pub(crate) fn spawn_capture(
    session: Arc<CaptureState>,
    device: Box<dyn CaptureDevice>,
    chunk_size: usize,
) -> JoinHandle<Box<dyn CaptureDevice>> {
    tokio::task::spawn_blocking(move || run_capture(&session, device, chunk_size))
}

/// Pull chunks until the session stops or the device fails.
///
/// The stop flag is only checked between reads, so a stop takes effect after
/// at most one `read_chunk`. A chunk that completes after the stop was
/// requested is dropped, keeping the buffer frozen once the flag is clear.
fn run_capture(
    session: &CaptureState,
    mut device: Box<dyn CaptureDevice>,
    chunk_size: usize,
) -> Box<dyn CaptureDevice> {
    let id = session.id();
    info!("Capture task started for recording {}", id);

    while session.is_recording() {
        match device.read_chunk(chunk_size) {
            Ok(chunk) => {
                if !session.is_recording() {
                    debug!("Recording {}: dropping chunk read after stop", id);
                    break;
                }

                let total = session.append_chunk(&chunk);
                debug!(
                    "Recording {}: {} bytes captured, level {:.2}",
                    id,
                    total,
                    session.current_level()
                );
            }
            Err(e) => {
                if session.fail(e.to_string()) {
                    error!("Recording {}: {}; capture ended", id, e);
                } else {
                    debug!("Recording {}: read failed while stopping: {}", id, e);
                }
                break;
            }
        }
    }

    info!("Capture task stopped for recording {}", id);
    device
}
