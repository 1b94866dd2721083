use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use super::device::FormatSpec;
use crate::error::{RecorderError, Result};

/// Size of the canonical PCM WAV header in bytes
pub const WAV_HEADER_SIZE: usize = 44;

/// Build a canonical 44-byte PCM WAV header for `data_size` bytes of payload.
///
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16
/// [20-21]  1 (PCM)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate
/// [32-33]  block_align
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn wav_header(spec: &FormatSpec, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let mut header = [0u8; WAV_HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&spec.channels.to_le_bytes());
    header[24..28].copy_from_slice(&spec.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&spec.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&spec.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&spec.bits_per_sample.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Write `pcm` to `path` as a WAV file.
///
/// A failed write removes the partially written file before returning.
pub fn write_wav(path: &Path, pcm: &[u8], spec: &FormatSpec) -> Result<()> {
    let io_err = |source: std::io::Error| RecorderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let data_size = u32::try_from(pcm.len())
        .ok()
        .filter(|size| *size <= u32::MAX - 36)
        .ok_or_else(|| {
            io_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} bytes of PCM exceeds the WAV size limit", pcm.len()),
            ))
        })?;

    let file = File::create(path).map_err(io_err)?;

    let written = write_contents(BufWriter::new(file), &wav_header(spec, data_size), pcm);
    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(path) {
            warn!("Failed to remove partial WAV file {}: {}", path.display(), cleanup);
        }
        return Err(io_err(e));
    }

    info!(
        "Wrote {} ({} bytes of PCM, {} bytes total)",
        path.display(),
        pcm.len(),
        WAV_HEADER_SIZE + pcm.len()
    );

    Ok(())
}

fn write_contents<W: Write>(mut writer: BufWriter<W>, header: &[u8], pcm: &[u8]) -> std::io::Result<()> {
    writer.write_all(header)?;
    writer.write_all(pcm)?;
    writer.flush()
}
