use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::frame_annotator::FrameAnnotator;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::region::Region;

/// Single-image detection pipeline: read → detect → (annotate → write).
pub struct DetectImageUseCase {
    reader: Box<dyn ImageReader>,
    detector: Box<dyn FaceDetector>,
    annotator: Box<dyn FrameAnnotator>,
    writer: Box<dyn ImageWriter>,
}

impl DetectImageUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        annotator: Box<dyn FrameAnnotator>,
        writer: Box<dyn ImageWriter>,
    ) -> Self {
        Self {
            reader,
            detector,
            annotator,
            writer,
        }
    }

    /// Detects faces in `input_path`. When `output_path` is given, an
    /// annotated copy of the image is written there.
    pub fn execute(
        &self,
        input_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let mut frame = self.reader.read(input_path)?;
        log::info!(
            "Detecting faces in {} ({}x{})",
            input_path.display(),
            frame.width(),
            frame.height()
        );

        let regions = self.detector.detect(&frame)?;
        log::info!("Found {} candidate windows", regions.len());

        if let Some(output) = output_path {
            self.annotator.annotate(&mut frame, &regions);
            self.writer.write(output, &frame)?;
            log::info!("Annotated image written to {}", output.display());
        }

        Ok(regions)
    }
}
