use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::cascade_model::{
    CascadeModel, CascadeSize, FeatureRect, Node, Stage,
};
use crate::shared::error::DetectionError;

#[derive(Error, Debug)]
pub enum CascadeLoadError {
    #[error("failed to read cascade {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid cascade JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] DetectionError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCascade {
    cascade_size: RawSize,
    #[serde(default)]
    nstages: Option<usize>,
    stages: Vec<RawStage>,
    #[serde(default)]
    rects: Vec<RawRectList>,
}

#[derive(Deserialize)]
struct RawSize {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStage {
    stage_threshold: f64,
    #[serde(default)]
    nnodes: Option<usize>,
    nodes: Vec<RawNode>,
}

#[derive(Deserialize)]
struct RawNode {
    threshold: f64,
    left_val: f64,
    right_val: f64,
}

#[derive(Deserialize)]
struct RawRectList {
    data: Vec<String>,
}

/// Reads a cascade JSON file produced by the XML-to-JSON converter.
pub fn load(path: &Path) -> Result<CascadeModel, CascadeLoadError> {
    let json = fs::read_to_string(path).map_err(|source| CascadeLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse(&json)?;
    log::info!(
        "Loaded cascade {} ({}x{}, {} stages, {} nodes)",
        path.display(),
        model.size.width,
        model.size.height,
        model.stages.len(),
        model.node_count()
    );
    Ok(model)
}

/// Parses a cascade document.
///
/// `rects[k]` holds the feature rectangles of the k-th node, counting nodes
/// stage by stage. The rectangle text is parsed here, once.
pub fn parse(json: &str) -> Result<CascadeModel, CascadeLoadError> {
    let raw: RawCascade = serde_json::from_str(json)?;

    if let Some(declared) = raw.nstages {
        if declared != raw.stages.len() {
            return Err(DetectionError::model(format!(
                "nstages is {declared} but {} stages are present",
                raw.stages.len()
            ))
            .into());
        }
    }

    let total_nodes: usize = raw.stages.iter().map(|s| s.nodes.len()).sum();
    if raw.rects.len() < total_nodes {
        return Err(DetectionError::model(format!(
            "cascade has {total_nodes} nodes but only {} rectangle lists",
            raw.rects.len()
        ))
        .into());
    }

    let mut rect_lists = raw.rects.into_iter();
    let mut stages = Vec::with_capacity(raw.stages.len());
    for (s, raw_stage) in raw.stages.into_iter().enumerate() {
        if let Some(declared) = raw_stage.nnodes {
            if declared != raw_stage.nodes.len() {
                return Err(DetectionError::model(format!(
                    "stage {s} declares {declared} nodes but has {}",
                    raw_stage.nodes.len()
                ))
                .into());
            }
        }

        let mut nodes = Vec::with_capacity(raw_stage.nodes.len());
        for (n, raw_node) in raw_stage.nodes.into_iter().enumerate() {
            let list = rect_lists.next().map(|l| l.data).unwrap_or_default();
            let rects = list
                .iter()
                .map(|text| parse_rect(text))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| DetectionError::model(format!("stage {s} node {n}: {e}")))?;
            nodes.push(Node {
                threshold: raw_node.threshold,
                left_val: raw_node.left_val,
                right_val: raw_node.right_val,
                rects,
            });
        }
        stages.push(Stage {
            threshold: raw_stage.stage_threshold,
            nodes,
        });
    }

    let size = CascadeSize {
        width: raw.cascade_size.width,
        height: raw.cascade_size.height,
    };
    Ok(CascadeModel::new(size, stages)?)
}

/// Parses `"x y w h weight"`, where any number may carry a trailing `.`.
fn parse_rect(text: &str) -> Result<FeatureRect, String> {
    let values = text
        .split_whitespace()
        .map(|token| {
            let token = token.strip_suffix('.').unwrap_or(token);
            token
                .parse::<f64>()
                .map_err(|_| format!("invalid number {token:?} in rectangle {text:?}"))
        })
        .collect::<Result<Vec<f64>, String>>()?;

    match values.as_slice() {
        &[x, y, width, height, weight] => Ok(FeatureRect::new(x, y, width, height, weight)),
        _ => Err(format!(
            "rectangle {text:?} has {} values, expected 5",
            values.len()
        )),
    }
}
