/// Normalized RMS loudness of a chunk of interleaved 16-bit little-endian PCM.
///
/// A trailing odd byte is ignored. Returns 0.0 for a chunk with no whole
/// sample, otherwise a value in `[0.0, 1.0]`.
pub fn compute_level(chunk: &[u8]) -> f64 {
    let samples = chunk.chunks_exact(2);
    let sample_count = samples.len();
    if sample_count == 0 {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .map(|pair| {
            let sample = i16::from_le_bytes([pair[0], pair[1]]) as f64 / 32768.0;
            sample * sample
        })
        .sum();

    (sum_squares / sample_count as f64).sqrt().min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_empty_chunk_is_silent() {
        assert_eq!(compute_level(&[]), 0.0);
    }

    #[test]
    fn test_single_odd_byte_is_silent() {
        assert_eq!(compute_level(&[0x7f]), 0.0);
    }

    #[test]
    fn test_all_zero_chunk() {
        assert_eq!(compute_level(&vec![0u8; 4096]), 0.0);
    }

    #[test]
    fn test_full_scale_negative_clamps_to_one() {
        // -32768 / 32768 = -1.0 exactly
        let chunk = pcm(&vec![i16::MIN; 2048]);
        assert_eq!(compute_level(&chunk), 1.0);
    }

    #[test]
    fn test_full_scale_positive_approaches_one() {
        let chunk = pcm(&vec![i16::MAX; 2048]);
        let level = compute_level(&chunk);
        assert!(level > 0.9999 && level <= 1.0, "got {}", level);
    }

    #[test]
    fn test_trailing_partial_sample_is_truncated() {
        let mut chunk = pcm(&[16384, -16384]);
        chunk.push(0xff);
        let level = compute_level(&chunk);
        assert!((level - 0.5).abs() < 1e-12, "got {}", level);
    }

    #[test]
    fn test_square_wave_rms() {
        // Alternating +/-8192 has RMS 0.25
        let chunk = pcm(&[8192, -8192, 8192, -8192]);
        assert!((compute_level(&chunk) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_level_bounded_for_arbitrary_bytes() {
        let chunk: Vec<u8> = (0..4096u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
        let level = compute_level(&chunk);
        assert!((0.0..=1.0).contains(&level), "got {}", level);
    }
}
