use crate::detection::domain::detection_window::DetectionWindow;
use crate::shared::region::Region;

/// Accumulates accepted windows in scan order.
///
/// Overlapping detections are kept as-is; no grouping is applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionCollector {
    regions: Vec<Region>,
}

impl DetectionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, window: &DetectionWindow) {
        self.regions.push(window.to_region());
    }

    /// Appends another collector's detections after this one's.
    pub fn extend(&mut self, other: DetectionCollector) {
        self.regions.extend(other.regions);
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }
}
