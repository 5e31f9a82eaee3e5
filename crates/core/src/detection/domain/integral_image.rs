//! Summed-area tables over a luminance image.
//!
//! Both tables carry a zero first row and column, so `table[[y, x]]` is the
//! sum over the half-open rectangle `[0, x) × [0, y)` and every in-bounds
//! rectangle sum is four lookups:
//! `S = I(x2, y2) - I(x1, y2) - I(x2, y1) + I(x1, y1)`.

use ndarray::Array2;

use crate::detection::domain::grayscale::GrayscaleImage;
use crate::shared::error::DetectionError;

/// Sum and squared-sum integral tables for one image.
///
/// Values are exact integers in the grayscale image's scaled units
/// (intensity times `LUMA_SCALE`), so rectangle sums never drift
/// regardless of image size.
#[derive(Clone, Debug)]
pub struct IntegralImage {
    sum: Array2<u64>,
    squared: Array2<u64>,
    width: u32,
    height: u32,
}

impl IntegralImage {
    /// Builds both tables in a single pass over the image.
    pub fn new(gray: &GrayscaleImage) -> Self {
        let w = gray.width() as usize;
        let h = gray.height() as usize;
        let mut sum = Array2::<u64>::zeros((h + 1, w + 1));
        let mut squared = Array2::<u64>::zeros((h + 1, w + 1));

        for (y, row) in gray.pixels().outer_iter().enumerate() {
            let mut row_sum = 0u64;
            let mut row_squared = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = value as u64;
                row_sum += v;
                row_squared += v * v;
                sum[[y + 1, x + 1]] = sum[[y, x + 1]] + row_sum;
                squared[[y + 1, x + 1]] = squared[[y, x + 1]] + row_squared;
            }
        }

        Self {
            sum,
            squared,
            width: gray.width(),
            height: gray.height(),
        }
    }

    /// Width of the source image (the table is one column wider).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the source image (the table is one row taller).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sum of intensities over `[x, x + width) × [y, y + height)`.
    pub fn sum(&self, x: u32, y: u32, width: u32, height: u32) -> Result<u64, DetectionError> {
        self.check_bounds(x, y, width, height)?;
        Ok(rect_sum(&self.sum, x, y, width, height))
    }

    /// Sum of squared intensities over `[x, x + width) × [y, y + height)`.
    pub fn squared_sum(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<u64, DetectionError> {
        self.check_bounds(x, y, width, height)?;
        Ok(rect_sum(&self.squared, x, y, width, height))
    }

    /// Raw table value `I(x, y)`: the sum over `[0, x) × [0, y)`.
    #[cfg(test)]
    fn at(&self, x: u32, y: u32) -> Option<u64> {
        self.sum.get([y as usize, x as usize]).copied()
    }

    fn check_bounds(&self, x: u32, y: u32, width: u32, height: u32) -> Result<(), DetectionError> {
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(DetectionError::Bounds {
                x,
                y,
                width,
                height,
                table_width: self.width,
                table_height: self.height,
            })
        }
    }
}

fn rect_sum(table: &Array2<u64>, x: u32, y: u32, width: u32, height: u32) -> u64 {
    let (x1, y1) = (x as usize, y as usize);
    let (x2, y2) = (x1 + width as usize, y1 + height as usize);
    // D + A >= B + C for any in-bounds rectangle, so this never underflows.
    (table[[y2, x2]] + table[[y1, x1]]) - (table[[y1, x2]] + table[[y2, x1]])
}
