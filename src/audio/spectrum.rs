// Coarse magnitude spectrum for the live display feed.
//
// This is a visualization aid, not an analysis product: each byte of
// the payload is treated as one signed 8-bit sample, and only the first
// quarter of the FFT bins are kept. The first halving drops the
// mirrored half of the real-input transform; the second halving is an
// empirical truncation carried over for display compatibility and has
// no spectral justification.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Transform a raw sample chunk into `floor(len / 4)` magnitudes.
///
/// An empty input yields an empty output; callers skip the display
/// update in that case so the previous spectrum stays on screen.
pub fn magnitude_spectrum(bytes: &[u8]) -> Vec<f32> {
    if bytes.is_empty() {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f32>> = bytes
        .iter()
        .map(|&b| Complex::new(b as i8 as f32, 0.0))
        .collect();

    let fft = FftPlanner::new().plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    buffer
        .iter()
        .take(bytes.len() / 4)
        .map(|bin| (bin.re * bin.re + bin.im * bin.im).sqrt())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_update() {
        assert!(magnitude_spectrum(&[]).is_empty());
    }

    #[test]
    fn output_length_is_quarter_of_input() {
        for len in [1usize, 3, 4, 7, 8, 160, 1024] {
            let bytes = vec![0u8; len];
            assert_eq!(magnitude_spectrum(&bytes).len(), len / 4);
        }
    }

    #[test]
    fn silence_yields_all_zero_magnitudes() {
        let magnitudes = magnitude_spectrum(&[0u8; 256]);
        assert_eq!(magnitudes.len(), 64);
        assert!(magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn dc_input_concentrates_in_first_bin() {
        // A constant signal has all its energy at DC.
        let magnitudes = magnitude_spectrum(&[1u8; 64]);
        assert_eq!(magnitudes.len(), 16);
        assert!((magnitudes[0] - 64.0).abs() < 1e-3);
        assert!(magnitudes[1..].iter().all(|&m| m.abs() < 1e-3));
    }

    #[test]
    fn magnitudes_are_non_negative() {
        let bytes: Vec<u8> = (0..200).map(|i| (i * 37 % 256) as u8).collect();
        assert!(magnitude_spectrum(&bytes).iter().all(|&m| m >= 0.0));
    }
}
