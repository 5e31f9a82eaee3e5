use crate::shared::error::DetectionError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Detection calls share no mutable state, hence `&self`.
pub trait FaceDetector: Send {
    fn detect(&self, frame: &Frame) -> Result<Vec<Region>, DetectionError>;
}
