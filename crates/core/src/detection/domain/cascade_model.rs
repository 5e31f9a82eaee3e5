use crate::shared::error::DetectionError;

/// Base training window of a cascade, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CascadeSize {
    pub width: u32,
    pub height: u32,
}

/// One weighted rectangle of a Haar-like feature, relative to the base window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

impl FeatureRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64, weight: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            weight,
        }
    }
}

/// A weak classifier: one feature and the two values it can vote.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub threshold: f64,
    /// Voted when the normalized feature is below `threshold * deviation`.
    pub left_val: f64,
    pub right_val: f64,
    pub rects: Vec<FeatureRect>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub threshold: f64,
    pub nodes: Vec<Node>,
}

/// A pretrained attentional cascade. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct CascadeModel {
    pub size: CascadeSize,
    pub stages: Vec<Stage>,
}

impl CascadeModel {
    pub fn new(size: CascadeSize, stages: Vec<Stage>) -> Result<Self, DetectionError> {
        let model = Self { size, stages };
        model.validate()?;
        Ok(model)
    }

    pub fn node_count(&self) -> usize {
        self.stages.iter().map(|s| s.nodes.len()).sum()
    }

    /// Checks that every stage, node and rectangle is present and usable.
    ///
    /// Rectangles must lie inside the base window so that, once scaled, they
    /// stay inside every scanned window.
    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(DetectionError::model(format!(
                "cascade window must be non-empty, got {}x{}",
                self.size.width, self.size.height
            )));
        }
        if self.stages.is_empty() {
            return Err(DetectionError::model("cascade has no stages"));
        }

        for (s, stage) in self.stages.iter().enumerate() {
            if !stage.threshold.is_finite() {
                return Err(DetectionError::model(format!(
                    "stage {s} threshold is not finite"
                )));
            }
            if stage.nodes.is_empty() {
                return Err(DetectionError::model(format!("stage {s} has no nodes")));
            }
            for (n, node) in stage.nodes.iter().enumerate() {
                self.validate_node(s, n, node)?;
            }
        }
        Ok(())
    }

    fn validate_node(&self, s: usize, n: usize, node: &Node) -> Result<(), DetectionError> {
        let finite = [node.threshold, node.left_val, node.right_val]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(DetectionError::model(format!(
                "stage {s} node {n} has a non-finite threshold or vote"
            )));
        }
        if node.rects.is_empty() {
            return Err(DetectionError::model(format!(
                "stage {s} node {n} has no rectangles"
            )));
        }

        let (bw, bh) = (self.size.width as f64, self.size.height as f64);
        for (r, rect) in node.rects.iter().enumerate() {
            let fields = [rect.x, rect.y, rect.width, rect.height, rect.weight];
            if !fields.iter().all(|v| v.is_finite()) {
                return Err(DetectionError::model(format!(
                    "stage {s} node {n} rect {r} has a non-finite field"
                )));
            }
            let inside = rect.x >= 0.0
                && rect.y >= 0.0
                && rect.width > 0.0
                && rect.height > 0.0
                && rect.x + rect.width <= bw
                && rect.y + rect.height <= bh;
            if !inside {
                return Err(DetectionError::model(format!(
                    "stage {s} node {n} rect {r} ({} {} {} {}) leaves the {}x{} window",
                    rect.x, rect.y, rect.width, rect.height, self.size.width, self.size.height
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn node(rects: Vec<FeatureRect>) -> Node {
        Node {
            threshold: 0.0,
            left_val: -1.0,
            right_val: 1.0,
            rects,
        }
    }

    fn model_with_rect(rect: FeatureRect) -> CascadeModel {
        CascadeModel {
            size: CascadeSize {
                width: 20,
                height: 20,
            },
            stages: vec![Stage {
                threshold: 0.0,
                nodes: vec![node(vec![rect])],
            }],
        }
    }

    #[test]
    fn test_valid_model_passes() {
        let model = model_with_rect(FeatureRect::new(0.0, 0.0, 20.0, 20.0, 1.0));
        assert!(model.validate().is_ok());
        assert_eq!(model.node_count(), 1);
    }

    #[test]
    fn test_new_validates() {
        let result = CascadeModel::new(
            CascadeSize {
                width: 20,
                height: 20,
            },
            Vec::new(),
        );
        assert_eq!(
            result,
            Err(DetectionError::Model("cascade has no stages".to_string()))
        );
    }

    #[test]
    fn test_empty_window_is_model_error() {
        let mut model = model_with_rect(FeatureRect::new(0.0, 0.0, 1.0, 1.0, 1.0));
        model.size.height = 0;
        assert!(matches!(model.validate(), Err(DetectionError::Model(_))));
    }

    #[test]
    fn test_stage_without_nodes_is_model_error() {
        let mut model = model_with_rect(FeatureRect::new(0.0, 0.0, 1.0, 1.0, 1.0));
        model.stages[0].nodes.clear();
        let err = model.validate().unwrap_err();
        assert_eq!(err, DetectionError::model("stage 0 has no nodes"));
    }

    #[test]
    fn test_node_without_rects_is_model_error() {
        let mut model = model_with_rect(FeatureRect::new(0.0, 0.0, 1.0, 1.0, 1.0));
        model.stages[0].nodes[0].rects.clear();
        let err = model.validate().unwrap_err();
        assert_eq!(err, DetectionError::model("stage 0 node 0 has no rectangles"));
    }

    #[test]
    fn test_non_finite_stage_threshold_is_model_error() {
        let mut model = model_with_rect(FeatureRect::new(0.0, 0.0, 1.0, 1.0, 1.0));
        model.stages[0].threshold = f64::NAN;
        assert!(matches!(model.validate(), Err(DetectionError::Model(_))));
    }

    #[rstest]
    #[case::negative_origin(FeatureRect::new(-1.0, 0.0, 4.0, 4.0, 1.0))]
    #[case::past_right(FeatureRect::new(18.0, 0.0, 3.0, 4.0, 1.0))]
    #[case::past_bottom(FeatureRect::new(0.0, 10.0, 4.0, 11.0, 1.0))]
    #[case::zero_width(FeatureRect::new(2.0, 2.0, 0.0, 4.0, 1.0))]
    #[case::infinite_weight(FeatureRect::new(0.0, 0.0, 4.0, 4.0, f64::INFINITY))]
    fn test_bad_rect_is_model_error(#[case] rect: FeatureRect) {
        let model = model_with_rect(rect);
        assert!(matches!(model.validate(), Err(DetectionError::Model(_))));
    }
}
