use crate::shared::region::Region;

/// Scales a base-window length and rounds half up to whole pixels.
pub fn scale_length(value: f64, scale: f64) -> u32 {
    (value * scale + 0.5).floor().max(0.0) as u32
}

/// A candidate region under evaluation at a given scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Factor between this window and the cascade's base window.
    pub scale: f64,
}

impl DetectionWindow {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn to_region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }
}
