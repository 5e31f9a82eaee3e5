use crate::detection::domain::cascade_model::{CascadeModel, FeatureRect, Node};
use crate::detection::domain::cascade_observer::{CascadeObserver, StageOutcome};
use crate::detection::domain::detection_window::{scale_length, DetectionWindow};
use crate::detection::domain::integral_image::IntegralImage;
use crate::shared::constants::LUMA_SCALE;
use crate::shared::error::DetectionError;

const LEVEL: f64 = LUMA_SCALE as f64;

/// Intensity statistics of one window, used for variance normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub variance: f64,
    /// `sqrt(variance)`, or 1 for flat windows.
    pub deviation: f64,
    pub inverse_area: f64,
}

/// Final decision for one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    /// Stages run before the decision, including the deciding stage.
    pub stages_evaluated: usize,
}

/// Classifies windows against a cascade using precomputed integral tables.
///
/// Holds only shared references, so one evaluator can be used from many
/// worker threads at once.
#[derive(Clone, Copy)]
pub struct CascadeEvaluator<'a> {
    model: &'a CascadeModel,
    integral: &'a IntegralImage,
}

impl<'a> CascadeEvaluator<'a> {
    /// Validates the model up front so no window is scored against a
    /// malformed cascade.
    pub fn new(model: &'a CascadeModel, integral: &'a IntegralImage) -> Result<Self, DetectionError> {
        model.validate()?;
        Ok(Self { model, integral })
    }

    /// Mean and deviation in 8-bit intensity levels.
    pub fn window_stats(&self, window: &DetectionWindow) -> Result<WindowStats, DetectionError> {
        if window.width == 0 || window.height == 0 {
            return Err(DetectionError::input(format!(
                "window at ({}, {}) has zero size",
                window.x, window.y
            )));
        }
        let (x, y, w, h) = (window.x, window.y, window.width, window.height);
        let sum = self.integral.sum(x, y, w, h)?;
        let squared = self.integral.squared_sum(x, y, w, h)?;

        let area = window.area();
        let inverse_area = 1.0 / area as f64;
        let mean = sum as f64 / LEVEL * inverse_area;

        // area * Σv² - (Σv)², computed exactly in scaled units; never negative.
        let numerator =
            (area as u128 * squared as u128).saturating_sub(sum as u128 * sum as u128);
        let variance = numerator as f64 / (LEVEL * LEVEL) * inverse_area * inverse_area;
        let deviation = if variance > 0.0 { variance.sqrt() } else { 1.0 };

        Ok(WindowStats {
            mean,
            variance,
            deviation,
            inverse_area,
        })
    }

    /// Value a single weak classifier votes for this window.
    pub fn node_vote(
        &self,
        node: &Node,
        window: &DetectionWindow,
        stats: &WindowStats,
    ) -> Result<f64, DetectionError> {
        let mut feature = 0.0;
        for rect in &node.rects {
            let (x, y, w, h) = place_rect(rect, window);
            feature += self.integral.sum(x, y, w, h)? as f64 / LEVEL * rect.weight;
        }

        if feature * stats.inverse_area < node.threshold * stats.deviation {
            Ok(node.left_val)
        } else {
            Ok(node.right_val)
        }
    }

    /// Runs stage `index` and reports whether the cascade continues,
    /// rejects, or has accepted the window.
    pub fn evaluate_stage(
        &self,
        index: usize,
        window: &DetectionWindow,
        stats: &WindowStats,
    ) -> Result<StageOutcome, DetectionError> {
        let stage = self
            .model
            .stages
            .get(index)
            .ok_or_else(|| DetectionError::model(format!("cascade has no stage {index}")))?;

        let mut accumulated = 0.0;
        for node in &stage.nodes {
            accumulated += self.node_vote(node, window, stats)?;
        }

        Ok(if accumulated < stage.threshold {
            StageOutcome::Reject
        } else if index + 1 == self.model.stages.len() {
            StageOutcome::Accept
        } else {
            StageOutcome::Continue
        })
    }

    /// Runs stages in order until one rejects or all pass.
    pub fn evaluate(
        &self,
        window: &DetectionWindow,
        observer: &mut dyn CascadeObserver,
    ) -> Result<Verdict, DetectionError> {
        let stats = self.window_stats(window)?;
        let mut index = 0;
        loop {
            let outcome = self.evaluate_stage(index, window, &stats)?;
            observer.stage_evaluated(index, outcome);
            match outcome {
                StageOutcome::Continue => index += 1,
                StageOutcome::Reject | StageOutcome::Accept => {
                    return Ok(Verdict {
                        accepted: outcome == StageOutcome::Accept,
                        stages_evaluated: index + 1,
                    });
                }
            }
        }
    }
}

/// Scales a feature rectangle into image coordinates, clipped to the window.
fn place_rect(rect: &FeatureRect, window: &DetectionWindow) -> (u32, u32, u32, u32) {
    let right_limit = window.x + window.width;
    let bottom_limit = window.y + window.height;

    let left = (window.x + scale_length(rect.x, window.scale)).min(right_limit);
    let top = (window.y + scale_length(rect.y, window.scale)).min(bottom_limit);
    let right = (left + scale_length(rect.width, window.scale)).min(right_limit);
    let bottom = (top + scale_length(rect.height, window.scale)).min(bottom_limit);

    (left, top, right - left, bottom - top)
}
