use thiserror::Error;

/// Failures raised by the detection core.
///
/// All variants are fail-fast: the current detection call aborts and the
/// caller is expected to fix its inputs and re-invoke.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("malformed cascade model: {0}")]
    Model(String),
    #[error(
        "rectangle at ({x}, {y}) sized {width}x{height} exceeds integral table \
         of {table_width}x{table_height}"
    )]
    Bounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        table_width: u32,
        table_height: u32,
    },
    #[error("invalid input: {0}")]
    Input(String),
    #[error("detection cancelled")]
    Cancelled,
}

impl DetectionError {
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_message() {
        let e = DetectionError::model("stage 2 has no nodes");
        assert_eq!(e.to_string(), "malformed cascade model: stage 2 has no nodes");
    }

    #[test]
    fn test_bounds_error_message_names_table_extent() {
        let e = DetectionError::Bounds {
            x: 10,
            y: 4,
            width: 8,
            height: 8,
            table_width: 12,
            table_height: 12,
        };
        let msg = e.to_string();
        assert!(msg.contains("(10, 4)"));
        assert!(msg.contains("12x12"));
    }

    #[test]
    fn test_input_error_is_comparable() {
        assert_eq!(
            DetectionError::input("empty buffer"),
            DetectionError::Input("empty buffer".to_string())
        );
    }
}
