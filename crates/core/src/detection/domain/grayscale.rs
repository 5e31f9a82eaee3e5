use ndarray::Array2;

use crate::shared::constants::{LUMA_SCALE, LUMA_WEIGHTS};
use crate::shared::error::DetectionError;
use crate::shared::frame::{Frame, CHANNELS};

/// Single-channel luminance image, indexed `[[row, column]]`.
///
/// Samples hold `0.3 R + 0.59 G + 0.11 B` exactly, scaled by
/// [`LUMA_SCALE`] (white is 25500).
#[derive(Clone, Debug, PartialEq)]
pub struct GrayscaleImage {
    pixels: Array2<u16>,
}

impl GrayscaleImage {
    /// Reduces an RGBA frame to luminance. Alpha is ignored.
    pub fn from_frame(frame: &Frame) -> Result<Self, DetectionError> {
        let luma: Vec<u16> = frame
            .data()
            .chunks_exact(CHANNELS)
            .map(|px| scaled_luminance(px[0], px[1], px[2]))
            .collect();
        Self::from_scaled(frame.width(), frame.height(), luma)
    }

    /// Wraps a row-major buffer of whole 8-bit intensity levels.
    pub fn from_luma(width: u32, height: u32, luma: Vec<u8>) -> Result<Self, DetectionError> {
        let scaled = luma
            .into_iter()
            .map(|v| v as u16 * LUMA_SCALE as u16)
            .collect();
        Self::from_scaled(width, height, scaled)
    }

    fn from_scaled(width: u32, height: u32, luma: Vec<u16>) -> Result<Self, DetectionError> {
        if width == 0 || height == 0 {
            return Err(DetectionError::input(format!(
                "grayscale dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let pixels = Array2::from_shape_vec((height as usize, width as usize), luma)
            .map_err(|e| DetectionError::input(format!("luminance buffer: {e}")))?;
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.nrows() as u32
    }

    /// Scaled sample at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.pixels[[y as usize, x as usize]]
    }

    pub fn pixels(&self) -> &Array2<u16> {
        &self.pixels
    }
}

/// `30 R + 59 G + 11 B`: the luminance times [`LUMA_SCALE`], exact.
pub fn scaled_luminance(r: u8, g: u8, b: u8) -> u16 {
    let y = LUMA_WEIGHTS[0] * r as u32 + LUMA_WEIGHTS[1] * g as u32 + LUMA_WEIGHTS[2] * b as u32;
    y as u16
}

/// Luminance rounded half-up to the nearest 8-bit level, for display.
pub fn display_luminance(r: u8, g: u8, b: u8) -> u8 {
    ((scaled_luminance(r, g, b) as u32 + LUMA_SCALE / 2) / LUMA_SCALE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::black(0, 0, 0, 0)]
    #[case::white(255, 255, 255, 25500)]
    #[case::gray(128, 128, 128, 12800)]
    #[case::pure_red(200, 0, 0, 6000)]
    #[case::pure_green(0, 255, 0, 15045)]
    #[case::pure_blue(0, 0, 255, 2805)]
    fn test_luminance_weights(#[case] r: u8, #[case] g: u8, #[case] b: u8, #[case] expected: u16) {
        assert_eq!(scaled_luminance(r, g, b), expected);
    }

    #[rstest]
    #[case::pure_red(200, 0, 0, 60)]
    #[case::pure_green(0, 255, 0, 150)]
    #[case::half_rounds_up(5, 0, 0, 2)]
    #[case::white(255, 255, 255, 255)]
    fn test_display_luminance_rounds(
        #[case] r: u8,
        #[case] g: u8,
        #[case] b: u8,
        #[case] expected: u8,
    ) {
        assert_eq!(display_luminance(r, g, b), expected);
    }

    #[test]
    fn test_from_frame_keeps_fractional_luminance() {
        let frame = Frame::filled(3, 2, [0, 255, 0, 255]).unwrap();
        let gray = GrayscaleImage::from_frame(&frame).unwrap();
        // 150.45 levels, not rounded to 150.
        assert_eq!(gray.get(2, 1), 15045);
    }

    #[test]
    fn test_from_frame_preserves_dimensions() {
        let frame = Frame::filled(7, 3, [10, 20, 30, 255]).unwrap();
        let gray = GrayscaleImage::from_frame(&frame).unwrap();
        assert_eq!(gray.width(), 7);
        assert_eq!(gray.height(), 3);
    }

    #[test]
    fn test_from_frame_ignores_alpha() {
        let opaque = Frame::filled(2, 2, [90, 60, 30, 255]).unwrap();
        let clear = Frame::filled(2, 2, [90, 60, 30, 0]).unwrap();
        assert_eq!(
            GrayscaleImage::from_frame(&opaque).unwrap(),
            GrayscaleImage::from_frame(&clear).unwrap()
        );
    }

    #[test]
    fn test_from_frame_is_row_major() {
        // 2 wide, 2 tall: only pixel (x=1, y=0) is white
        let mut data = vec![0u8; 16];
        data[4..8].copy_from_slice(&[255, 255, 255, 255]);
        let frame = Frame::new(data, 2, 2).unwrap();
        let gray = GrayscaleImage::from_frame(&frame).unwrap();
        assert_eq!(gray.get(1, 0), 25500);
        assert_eq!(gray.get(0, 1), 0);
    }

    #[test]
    fn test_from_luma_matches_equivalent_gray_frame() {
        let frame = Frame::filled(4, 3, [77, 77, 77, 255]).unwrap();
        assert_eq!(
            GrayscaleImage::from_luma(4, 3, vec![77; 12]).unwrap(),
            GrayscaleImage::from_frame(&frame).unwrap()
        );
    }

    #[test]
    fn test_from_luma_rejects_mismatched_length() {
        let result = GrayscaleImage::from_luma(3, 3, vec![0; 8]);
        assert!(matches!(result, Err(DetectionError::Input(_))));
    }

    #[test]
    fn test_from_luma_rejects_zero_size() {
        let result = GrayscaleImage::from_luma(0, 3, Vec::new());
        assert!(matches!(result, Err(DetectionError::Input(_))));
    }
}
