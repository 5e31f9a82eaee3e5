/// Scale applied to the cascade's base window on the first scan level.
pub const DEFAULT_INITIAL_SCALE: f64 = 4.0;

/// Multiplicative growth of the scan scale between levels.
pub const DEFAULT_SCALE_FACTOR: f64 = 1.25;

/// Stride multiplier; the pixel stride at a level is `round(scale * step)`.
pub const DEFAULT_STEP_SIZE: f64 = 2.0;

/// Luma weights applied to R, G and B, in hundredths (0.30, 0.59, 0.11).
pub const LUMA_WEIGHTS: [u32; 3] = [30, 59, 11];

/// Grayscale samples are stored in units of `1 / LUMA_SCALE` intensity
/// levels, so the weighted sum stays an exact integer.
pub const LUMA_SCALE: u32 = 100;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
