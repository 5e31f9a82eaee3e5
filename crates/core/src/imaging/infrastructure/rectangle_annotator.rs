use ndarray::s;

use crate::detection::domain::grayscale::display_luminance;
use crate::imaging::domain::frame_annotator::FrameAnnotator;
use crate::shared::frame::{Frame, CHANNELS};
use crate::shared::region::Region;

const DEFAULT_COLOR: [u8; 4] = [0, 0, 0, 255];
const DEFAULT_THICKNESS: u32 = 1;

/// Draws each region as an unfilled rectangle outline.
///
/// Outlines grow inward from the region's edges and are clipped to the
/// frame. With `grayscale_preview`, the frame is first replaced by the
/// luminance the detector saw, rounded to 8 bits.
#[derive(Clone, Debug)]
pub struct RectangleAnnotator {
    color: [u8; 4],
    thickness: u32,
    grayscale_preview: bool,
}

impl RectangleAnnotator {
    pub fn new(color: [u8; 4], thickness: u32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
            grayscale_preview: false,
        }
    }

    pub fn with_grayscale_preview(mut self, enabled: bool) -> Self {
        self.grayscale_preview = enabled;
        self
    }

    fn to_grayscale(frame: &mut Frame) {
        for px in frame.data_mut().chunks_exact_mut(CHANNELS) {
            let y = display_luminance(px[0], px[1], px[2]);
            px[..3].fill(y);
        }
    }

    /// Fills the frame-clipped intersection of `[x0, x1) x [y0, y1)`.
    fn fill(&self, frame: &mut Frame, x0: u32, y0: u32, x1: u32, y1: u32) {
        let x1 = x1.min(frame.width()) as usize;
        let y1 = y1.min(frame.height()) as usize;
        let (x0, y0) = (x0 as usize, y0 as usize);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let mut view = frame.as_ndarray_mut();
        for mut px in view.slice_mut(s![y0..y1, x0..x1, ..]).rows_mut() {
            px.assign(&ndarray::aview1(&self.color));
        }
    }
}

impl Default for RectangleAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR, DEFAULT_THICKNESS)
    }
}

impl FrameAnnotator for RectangleAnnotator {
    fn annotate(&self, frame: &mut Frame, regions: &[Region]) {
        if self.grayscale_preview {
            Self::to_grayscale(frame);
        }

        for r in regions {
            if r.width == 0 || r.height == 0 {
                continue;
            }
            let t = self.thickness.min(r.width).min(r.height);
            let (right, bottom) = (r.right(), r.bottom());
            self.fill(frame, r.x, r.y, right, r.y + t);
            self.fill(frame, r.x, bottom - t, right, bottom);
            self.fill(frame, r.x, r.y, r.x + t, bottom);
            self.fill(frame, right - t, r.y, right, bottom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BG: [u8; 4] = [10, 20, 30, 255];

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * frame.width() + x) * 4) as usize;
        frame.data()[i..i + 4].try_into().unwrap()
    }

    fn painted(frame: &Frame) -> usize {
        frame.data().chunks_exact(4).filter(|px| *px == RED).count()
    }

    #[test]
    fn test_outline_only() {
        let mut frame = Frame::filled(20, 20, BG).unwrap();
        RectangleAnnotator::new(RED, 1).annotate(&mut frame, &[Region::new(2, 3, 5, 4)]);

        assert_eq!(pixel(&frame, 2, 3), RED);
        assert_eq!(pixel(&frame, 6, 3), RED);
        assert_eq!(pixel(&frame, 2, 6), RED);
        assert_eq!(pixel(&frame, 6, 6), RED);
        assert_eq!(pixel(&frame, 4, 4), BG);
        assert_eq!(pixel(&frame, 7, 3), BG);
        // Perimeter of a 5x4 rectangle.
        assert_eq!(painted(&frame), 2 * 5 + 2 * 2);
    }

    #[rstest]
    #[case::thin(1, 4 * 10 - 4)]
    #[case::thick(2, 10 * 10 - 6 * 6)]
    #[case::fills_small_box(8, 100)]
    fn test_thickness_grows_inward(#[case] thickness: u32, #[case] expected: usize) {
        let mut frame = Frame::filled(30, 30, BG).unwrap();
        RectangleAnnotator::new(RED, thickness).annotate(&mut frame, &[Region::new(5, 5, 10, 10)]);
        assert_eq!(painted(&frame), expected);
    }

    #[test]
    fn test_region_past_frame_is_clipped() {
        let mut frame = Frame::filled(10, 10, BG).unwrap();
        RectangleAnnotator::new(RED, 1).annotate(&mut frame, &[Region::new(6, 6, 10, 10)]);
        // Only the top and left edges are visible: 4 + 4 - 1 corner.
        assert_eq!(painted(&frame), 7);
        assert_eq!(pixel(&frame, 9, 6), RED);
        assert_eq!(pixel(&frame, 9, 9), BG);
    }

    #[test]
    fn test_empty_region_is_ignored() {
        let mut frame = Frame::filled(10, 10, BG).unwrap();
        RectangleAnnotator::new(RED, 1).annotate(&mut frame, &[Region::new(3, 3, 0, 5)]);
        assert_eq!(painted(&frame), 0);
    }

    #[test]
    fn test_grayscale_preview_replaces_colour() {
        let mut frame = Frame::filled(4, 4, [200, 0, 0, 255]).unwrap();
        RectangleAnnotator::new(RED, 1)
            .with_grayscale_preview(true)
            .annotate(&mut frame, &[]);
        assert_eq!(pixel(&frame, 1, 1), [60, 60, 60, 255]);
    }

    #[test]
    fn test_default_is_thin_black() {
        let mut frame = Frame::filled(6, 6, [255, 255, 255, 255]).unwrap();
        RectangleAnnotator::default().annotate(&mut frame, &[Region::new(0, 0, 6, 6)]);
        assert_eq!(pixel(&frame, 0, 0), [0, 0, 0, 255]);
        assert_eq!(pixel(&frame, 1, 1), [255, 255, 255, 255]);
    }
}
