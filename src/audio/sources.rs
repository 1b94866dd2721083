// Bundled capture backends
//
// Real hardware drivers live outside this crate. These backends let the
// binary and the HTTP API run end to end: a synthetic tone and a WAV file
// replayed as if it were a live input. Both pace reads to real time.

use std::f64::consts::TAU;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use hound::WavReader;
use tracing::info;

use super::device::{CaptureBackend, CaptureDevice, FormatSpec};
use crate::error::DeviceError;

/// Sleeps so that reads are delivered no faster than the audio would play
struct Pacer {
    byte_rate: u32,
    next_deadline: Instant,
}

impl Pacer {
    fn new(spec: &FormatSpec) -> Self {
        Self {
            byte_rate: spec.byte_rate(),
            next_deadline: Instant::now(),
        }
    }

    fn wait_for(&mut self, bytes: usize) {
        self.next_deadline += Duration::from_secs_f64(bytes as f64 / self.byte_rate as f64);
        let now = Instant::now();
        if self.next_deadline > now {
            std::thread::sleep(self.next_deadline - now);
        }
    }
}

fn require_16_bit(spec: &FormatSpec) -> Result<(), DeviceError> {
    if spec.bits_per_sample != 16 {
        return Err(DeviceError::Open(format!(
            "unsupported bit depth: {} (only 16-bit PCM)",
            spec.bits_per_sample
        )));
    }
    Ok(())
}

// ============================================================================
// Tone
// ============================================================================

/// Synthesizes a sine tone on every channel
#[derive(Debug, Clone)]
pub struct ToneBackend {
    frequency_hz: f64,
    amplitude: f64,
}

impl ToneBackend {
    pub fn new(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            amplitude: 0.5,
        }
    }
}

impl CaptureBackend for ToneBackend {
    fn open(&self, spec: &FormatSpec) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        require_16_bit(spec)?;
        if self.frequency_hz <= 0.0 || self.frequency_hz >= spec.sample_rate as f64 / 2.0 {
            return Err(DeviceError::Open(format!(
                "tone frequency {}Hz outside (0, {}Hz)",
                self.frequency_hz,
                spec.sample_rate / 2
            )));
        }

        info!(
            "Tone device opened ({}Hz tone, {}Hz, {} channels)",
            self.frequency_hz, spec.sample_rate, spec.channels
        );

        Ok(Box::new(ToneDevice {
            spec: *spec,
            phase_step: TAU * self.frequency_hz / spec.sample_rate as f64,
            phase: 0.0,
            amplitude: self.amplitude,
            pacer: Pacer::new(spec),
        }))
    }

    fn name(&self) -> &str {
        "tone"
    }
}

struct ToneDevice {
    spec: FormatSpec,
    phase_step: f64,
    phase: f64,
    amplitude: f64,
    pacer: Pacer,
}

impl CaptureDevice for ToneDevice {
    fn read_chunk(&mut self, size: usize) -> Result<Vec<u8>, DeviceError> {
        let channels = self.spec.channels as usize;
        let mut chunk = Vec::with_capacity(size);

        while chunk.len() < size {
            let sample = (self.phase.sin() * self.amplitude * i16::MAX as f64) as i16;
            for _ in 0..channels {
                chunk.extend_from_slice(&sample.to_le_bytes());
            }
            self.phase = (self.phase + self.phase_step) % TAU;
        }
        chunk.truncate(size);

        self.pacer.wait_for(size);
        Ok(chunk)
    }

    fn close(self: Box<Self>) {
        info!("Tone device closed");
    }
}

// ============================================================================
// WAV file
// ============================================================================

/// Replays 16-bit PCM from a WAV file whose format matches the session's
#[derive(Debug, Clone)]
pub struct WavFileBackend {
    path: PathBuf,
}

impl WavFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureBackend for WavFileBackend {
    fn open(&self, spec: &FormatSpec) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        require_16_bit(spec)?;

        let reader = WavReader::open(&self.path)
            .map_err(|e| DeviceError::Open(format!("{}: {}", self.path.display(), e)))?;

        let file_spec = reader.spec();
        if file_spec.sample_format != hound::SampleFormat::Int
            || file_spec.bits_per_sample != spec.bits_per_sample
            || file_spec.channels != spec.channels
            || file_spec.sample_rate != spec.sample_rate
        {
            return Err(DeviceError::Open(format!(
                "{}: expected {}Hz {}ch {}-bit PCM, got {}Hz {}ch {}-bit {:?}",
                self.path.display(),
                spec.sample_rate,
                spec.channels,
                spec.bits_per_sample,
                file_spec.sample_rate,
                file_spec.channels,
                file_spec.bits_per_sample,
                file_spec.sample_format
            )));
        }

        info!(
            "WAV replay device opened: {} ({} samples)",
            self.path.display(),
            reader.len()
        );

        Ok(Box::new(WavFileDevice {
            path: self.path.clone(),
            reader,
            pacer: Pacer::new(spec),
        }))
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

struct WavFileDevice {
    path: PathBuf,
    reader: WavReader<BufReader<File>>,
    pacer: Pacer,
}

impl CaptureDevice for WavFileDevice {
    fn read_chunk(&mut self, size: usize) -> Result<Vec<u8>, DeviceError> {
        let wanted = size / 2;
        let mut chunk = Vec::with_capacity(size);

        for sample in self.reader.samples::<i16>().take(wanted) {
            let sample = sample.map_err(|e| DeviceError::Read(e.to_string()))?;
            chunk.extend_from_slice(&sample.to_le_bytes());
        }

        if chunk.len() < size {
            return Err(DeviceError::Read(format!(
                "end of input {} ({} of {} bytes available)",
                self.path.display(),
                chunk.len(),
                size
            )));
        }

        self.pacer.wait_for(size);
        Ok(chunk)
    }

    fn close(self: Box<Self>) {
        info!("WAV replay device closed: {}", self.path.display());
    }
}
