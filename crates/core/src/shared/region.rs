use serde::{Deserialize, Serialize};

/// An accepted detection rectangle in source-image pixel coordinates.
///
/// `(x, y)` is the top-left corner; the rectangle spans
/// `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when the rectangle lies entirely inside a `width × height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_edges_and_area() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.area(), 1200);
    }

    #[test]
    fn test_display_is_space_separated() {
        assert_eq!(Region::new(1, 2, 3, 4).to_string(), "1 2 3 4");
    }

    #[rstest]
    #[case::inside(Region::new(0, 0, 10, 10), true)]
    #[case::touching_right_edge(Region::new(90, 0, 10, 10), true)]
    #[case::past_right_edge(Region::new(91, 0, 10, 10), false)]
    #[case::past_bottom_edge(Region::new(0, 95, 10, 10), false)]
    fn test_fits_within(#[case] region: Region, #[case] expected: bool) {
        assert_eq!(region.fits_within(100, 100), expected);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let json = serde_json::to_string(&Region::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, r#"{"x":1,"y":2,"width":3,"height":4}"#);
    }
}
