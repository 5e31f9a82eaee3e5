use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::detection::domain::cascade_evaluator::CascadeEvaluator;
use crate::detection::domain::cascade_model::CascadeModel;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::grayscale::GrayscaleImage;
use crate::detection::domain::integral_image::IntegralImage;
use crate::detection::domain::scale_scanner::{ScaleScanner, ScanParams};
use crate::detection::domain::scan_executor::{ScanExecutor, ScanReport, SequentialScanExecutor};
use crate::shared::error::DetectionError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Haar cascade face detector.
///
/// Each call converts the frame to grayscale, builds its integral tables
/// and scans every scale level. Nothing is cached between calls, so one
/// detector can serve frames of any size.
pub struct CascadeFaceDetector {
    model: Arc<CascadeModel>,
    params: ScanParams,
    executor: Box<dyn ScanExecutor>,
    cancelled: Arc<AtomicBool>,
}

impl CascadeFaceDetector {
    /// Creates a sequential detector. Fails if the model or parameters are invalid.
    pub fn new(model: Arc<CascadeModel>, params: ScanParams) -> Result<Self, DetectionError> {
        Self::with_executor(model, params, Box::new(SequentialScanExecutor))
    }

    pub fn with_executor(
        model: Arc<CascadeModel>,
        params: ScanParams,
        executor: Box<dyn ScanExecutor>,
    ) -> Result<Self, DetectionError> {
        model.validate()?;
        params.validate()?;
        Ok(Self {
            model,
            params,
            executor,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that aborts in-flight and future detections once set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Runs a full detection and returns the detections with scan statistics.
    pub fn detect_with_report(&self, frame: &Frame) -> Result<ScanReport, DetectionError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(DetectionError::Cancelled);
        }

        let start = Instant::now();
        let gray = GrayscaleImage::from_frame(frame)?;
        let integral = IntegralImage::new(&gray);
        let prepared = start.elapsed();

        let evaluator = CascadeEvaluator::new(&self.model, &integral)?;
        let scanner = ScaleScanner::new(
            self.params,
            integral.width(),
            integral.height(),
            self.model.size,
        )?;
        let report = self.executor.execute(&scanner, &evaluator, &self.cancelled)?;

        log::debug!(
            "Scanned {}x{} frame: {} windows, {} detections (tables {:.1}ms, total {:.1}ms)",
            frame.width(),
            frame.height(),
            report.windows_evaluated,
            report.regions.len(),
            prepared.as_secs_f64() * 1000.0,
            start.elapsed().as_secs_f64() * 1000.0
        );
        if let Some(summary) = report.statistics.summary_string() {
            log::debug!("{summary}");
        }

        Ok(report)
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<Region>, DetectionError> {
        Ok(self.detect_with_report(frame)?.regions)
    }
}
