use std::sync::atomic::{AtomicBool, Ordering};

use crate::detection::domain::cascade_evaluator::CascadeEvaluator;
use crate::detection::domain::cascade_observer::StageStatistics;
use crate::detection::domain::detection_collector::DetectionCollector;
use crate::detection::domain::scale_scanner::ScaleScanner;
use crate::shared::error::DetectionError;
use crate::shared::region::Region;

/// Everything a scan produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanReport {
    /// Accepted windows, in scan order.
    pub regions: Vec<Region>,
    pub statistics: StageStatistics,
    pub windows_evaluated: usize,
}

/// Abstracts how the windows of a scan are distributed for evaluation.
///
/// This is a port. The sequential implementation below is the
/// deterministic reference; infrastructure provides a threaded one.
pub trait ScanExecutor: Send + Sync {
    fn execute(
        &self,
        scanner: &ScaleScanner,
        evaluator: &CascadeEvaluator<'_>,
        cancelled: &AtomicBool,
    ) -> Result<ScanReport, DetectionError>;
}

/// Scans every level on the calling thread, smallest windows first.
///
/// `cancelled` is checked between scale levels.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialScanExecutor;

impl ScanExecutor for SequentialScanExecutor {
    fn execute(
        &self,
        scanner: &ScaleScanner,
        evaluator: &CascadeEvaluator<'_>,
        cancelled: &AtomicBool,
    ) -> Result<ScanReport, DetectionError> {
        let mut collector = DetectionCollector::new();
        let mut statistics = StageStatistics::new();
        let mut windows_evaluated = 0;

        for level in scanner.levels() {
            if cancelled.load(Ordering::Relaxed) {
                return Err(DetectionError::Cancelled);
            }
            windows_evaluated +=
                scanner.scan_level(evaluator, &level, &mut collector, &mut statistics)?;
        }

        Ok(ScanReport {
            regions: collector.into_regions(),
            statistics,
            windows_evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::cascade_model::{
        CascadeModel, CascadeSize, FeatureRect, Node, Stage,
    };
    use crate::detection::domain::grayscale::GrayscaleImage;
    use crate::detection::domain::integral_image::IntegralImage;
    use crate::detection::domain::scale_scanner::ScanParams;

    fn single_stage(stage_threshold: f64) -> CascadeModel {
        CascadeModel {
            size: CascadeSize {
                width: 10,
                height: 10,
            },
            stages: vec![Stage {
                threshold: stage_threshold,
                nodes: vec![Node {
                    threshold: 0.0,
                    left_val: -1.0,
                    right_val: 1.0,
                    rects: vec![
                        FeatureRect::new(0.0, 0.0, 5.0, 10.0, 1.0),
                        FeatureRect::new(5.0, 0.0, 5.0, 10.0, -1.0),
                    ],
                }],
            }],
        }
    }

    fn flat_gray(width: u32, height: u32) -> IntegralImage {
        let gray =
            GrayscaleImage::from_luma(width, height, vec![128; (width * height) as usize]).unwrap();
        IntegralImage::new(&gray)
    }

    fn run(model: &CascadeModel, ii: &IntegralImage, cancelled: bool) -> Result<ScanReport, DetectionError> {
        let params = ScanParams {
            initial_scale: 1.0,
            scale_factor: 1.5,
            step_size: 2.0,
        };
        let scanner = ScaleScanner::new(params, ii.width(), ii.height(), model.size)?;
        let evaluator = CascadeEvaluator::new(model, ii)?;
        SequentialScanExecutor.execute(&scanner, &evaluator, &AtomicBool::new(cancelled))
    }

    #[test]
    fn test_flat_image_accepts_every_scanned_window() {
        let model = single_stage(0.0);
        let ii = flat_gray(48, 36);
        let report = run(&model, &ii, false).unwrap();

        assert!(report.windows_evaluated > 0);
        assert_eq!(report.regions.len(), report.windows_evaluated);
        assert_eq!(report.statistics.accepted(), report.windows_evaluated);
    }

    #[test]
    fn test_unreachable_stage_threshold_yields_nothing() {
        let model = single_stage(1.5);
        let ii = flat_gray(48, 36);
        let report = run(&model, &ii, false).unwrap();

        assert!(report.regions.is_empty());
        assert_eq!(report.statistics.rejections(0), report.windows_evaluated);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let luma: Vec<u8> = (0..64u32 * 48).map(|i| ((i * 7919) % 251) as u8).collect();
        let ii = IntegralImage::new(&GrayscaleImage::from_luma(64, 48, luma).unwrap());
        let model = single_stage(0.0);

        let first = run(&model, &ii, false).unwrap();
        let second = run(&model, &ii, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cancelled_scan_returns_cancelled() {
        let model = single_stage(0.0);
        let ii = flat_gray(48, 36);
        assert_eq!(run(&model, &ii, true), Err(DetectionError::Cancelled));
    }

    #[test]
    fn test_levels_are_scanned_smallest_first() {
        let model = single_stage(0.0);
        let ii = flat_gray(48, 36);
        let report = run(&model, &ii, false).unwrap();
        let widths: Vec<u32> = report.regions.iter().map(|r| r.width).collect();
        assert!(widths.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(widths.first(), Some(&10));
    }
}
