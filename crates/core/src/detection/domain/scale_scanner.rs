//! Multi-scale sliding-window enumeration.
//!
//! At each level the window is the cascade's base window scaled by the
//! current factor; positions step by a stride that grows with the scale.
//! Levels stop once the window meets or exceeds either image dimension.

use crate::detection::domain::cascade_evaluator::CascadeEvaluator;
use crate::detection::domain::cascade_model::CascadeSize;
use crate::detection::domain::cascade_observer::CascadeObserver;
use crate::detection::domain::detection_collector::DetectionCollector;
use crate::detection::domain::detection_window::{scale_length, DetectionWindow};
use crate::shared::constants::{DEFAULT_INITIAL_SCALE, DEFAULT_SCALE_FACTOR, DEFAULT_STEP_SIZE};
use crate::shared::error::DetectionError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    pub initial_scale: f64,
    /// Growth per level; must be greater than 1 so the scan terminates.
    pub scale_factor: f64,
    pub step_size: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            initial_scale: DEFAULT_INITIAL_SCALE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            step_size: DEFAULT_STEP_SIZE,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), DetectionError> {
        if !(self.initial_scale.is_finite() && self.initial_scale > 0.0) {
            return Err(DetectionError::input(format!(
                "initial scale must be positive, got {}",
                self.initial_scale
            )));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 1.0) {
            return Err(DetectionError::input(format!(
                "scale factor must be greater than 1, got {}",
                self.scale_factor
            )));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(DetectionError::input(format!(
                "step size must be positive, got {}",
                self.step_size
            )));
        }
        Ok(())
    }
}

/// Window geometry for one pass of the scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLevel {
    pub scale: f64,
    pub window_width: u32,
    pub window_height: u32,
    pub stride: u32,
}

impl ScaleLevel {
    pub fn window(&self, x: u32, y: u32) -> DetectionWindow {
        DetectionWindow {
            x,
            y,
            width: self.window_width,
            height: self.window_height,
            scale: self.scale,
        }
    }
}

/// Enumerates detection windows over an image and drives the evaluator.
#[derive(Clone, Debug)]
pub struct ScaleScanner {
    params: ScanParams,
    image_width: u32,
    image_height: u32,
    base: CascadeSize,
}

impl ScaleScanner {
    pub fn new(
        params: ScanParams,
        image_width: u32,
        image_height: u32,
        base: CascadeSize,
    ) -> Result<Self, DetectionError> {
        params.validate()?;
        if image_width == 0 || image_height == 0 {
            return Err(DetectionError::input(format!(
                "cannot scan a {image_width}x{image_height} image"
            )));
        }
        if base.width == 0 || base.height == 0 {
            return Err(DetectionError::model(format!(
                "cascade window must be non-empty, got {}x{}",
                base.width, base.height
            )));
        }
        Ok(Self {
            params,
            image_width,
            image_height,
            base,
        })
    }

    /// All scale levels whose window is strictly smaller than the image.
    pub fn levels(&self) -> Vec<ScaleLevel> {
        let mut levels = Vec::new();
        let mut scale = self.params.initial_scale;
        loop {
            let window_width = scale_length(self.base.width as f64, scale);
            let window_height = scale_length(self.base.height as f64, scale);
            if window_width >= self.image_width || window_height >= self.image_height {
                break;
            }
            if window_width > 0 && window_height > 0 {
                levels.push(ScaleLevel {
                    scale,
                    window_width,
                    window_height,
                    stride: scale_length(self.params.step_size, scale).max(1),
                });
            }
            scale *= self.params.scale_factor;
        }
        levels
    }

    /// Top edges of every row of windows at `level`, bottom edge inclusive.
    pub fn rows(&self, level: &ScaleLevel) -> impl Iterator<Item = u32> {
        positions(self.image_height, level.window_height, level.stride)
    }

    /// Left edges of every column of windows at `level`, right edge inclusive.
    pub fn columns(&self, level: &ScaleLevel) -> impl Iterator<Item = u32> {
        positions(self.image_width, level.window_width, level.stride)
    }

    /// Every window at `level` in row-major scan order.
    pub fn windows<'s>(&'s self, level: &'s ScaleLevel) -> impl Iterator<Item = DetectionWindow> + 's {
        self.rows(level)
            .flat_map(move |y| self.columns(level).map(move |x| level.window(x, y)))
    }

    /// Evaluates one row of windows; returns how many were evaluated.
    pub fn scan_row(
        &self,
        evaluator: &CascadeEvaluator<'_>,
        level: &ScaleLevel,
        y: u32,
        collector: &mut DetectionCollector,
        observer: &mut dyn CascadeObserver,
    ) -> Result<usize, DetectionError> {
        let mut evaluated = 0;
        for x in self.columns(level) {
            let window = level.window(x, y);
            if evaluator.evaluate(&window, observer)?.accepted {
                collector.push(&window);
            }
            evaluated += 1;
        }
        Ok(evaluated)
    }

    /// Evaluates every window of one level; returns how many were evaluated.
    pub fn scan_level(
        &self,
        evaluator: &CascadeEvaluator<'_>,
        level: &ScaleLevel,
        collector: &mut DetectionCollector,
        observer: &mut dyn CascadeObserver,
    ) -> Result<usize, DetectionError> {
        let mut evaluated = 0;
        for y in self.rows(level) {
            evaluated += self.scan_row(evaluator, level, y, collector, observer)?;
        }
        Ok(evaluated)
    }
}

fn positions(extent: u32, window: u32, stride: u32) -> impl Iterator<Item = u32> {
    let last = extent.checked_sub(window);
    (0..=last.unwrap_or(0))
        .step_by(stride.max(1) as usize)
        .take_while(move |_| last.is_some())
}
