use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Marks detected regions on a frame in place.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame, regions: &[Region]);
}
