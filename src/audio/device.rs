use crate::error::DeviceError;

/// Bytes pulled from a capture device per read
pub const CHUNK_SIZE: usize = 4096;

/// PCM format requested from a capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample (signed integer PCM)
    pub bits_per_sample: u16,
}

impl FormatSpec {
    /// 16-bit signed stereo at 44.1kHz, the only format sessions record in
    pub const CD_STEREO: FormatSpec = FormatSpec {
        sample_rate: 44100,
        channels: 2,
        bits_per_sample: 16,
    };

    /// Bytes per interleaved frame (one sample for every channel)
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    /// Bytes of PCM produced per second of audio
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self::CD_STEREO
    }
}

/// An open capture stream.
///
/// Owned by exactly one task at a time. `read_chunk` blocks until `size` bytes
/// are available or the device fails; `close` consumes the device so it can
/// only be released once.
pub trait CaptureDevice: Send {
    /// Block until a full chunk of `size` bytes is available
    fn read_chunk(&mut self, size: usize) -> Result<Vec<u8>, DeviceError>;

    /// Release the underlying device
    fn close(self: Box<Self>);
}

/// Opens capture devices.
///
/// Implementations:
/// - `ToneBackend`: synthetic sine tone (demos, smoke tests)
/// - `WavFileBackend`: replays a PCM WAV file
pub trait CaptureBackend: Send + Sync {
    /// Open a new device producing PCM in `spec`
    fn open(&self, spec: &FormatSpec) -> Result<Box<dyn CaptureDevice>, DeviceError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cd_stereo_rates() {
        let spec = FormatSpec::CD_STEREO;
        assert_eq!(spec.block_align(), 4);
        assert_eq!(spec.byte_rate(), 176_400);
    }
}
