pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use audio::{
    compute_level, write_wav, CaptureBackend, CaptureDevice, FormatSpec, ToneBackend,
    WavFileBackend, CHUNK_SIZE, WAV_HEADER_SIZE,
};
pub use config::Config;
pub use error::{DeviceError, RecorderError};
pub use http::{create_router, AppState};
pub use session::{RecordingSession, SessionId, SessionRegistry, SessionStats};
