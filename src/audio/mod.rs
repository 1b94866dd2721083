pub mod device;
pub mod level;
pub mod sources;
pub mod wav;

pub use device::{CaptureBackend, CaptureDevice, FormatSpec, CHUNK_SIZE};
pub use level::compute_level;
pub use sources::{ToneBackend, WavFileBackend};
pub use wav::{wav_header, write_wav, WAV_HEADER_SIZE};
