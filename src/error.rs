use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to open pose trace {1:?}")]
    OpenTrace(#[source] std::io::Error, PathBuf),

    #[error("failed to parse pose trace {1:?}")]
    ParseTrace(#[source] serde_json::Error, PathBuf),

    #[error("expected {expected} keypoints per pose, got {actual}")]
    KeypointCount { expected: usize, actual: usize },

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("unknown exercise kind: {0:?}")]
    ParseExerciseKind(String),

    #[error("failed to decode signaling message")]
    DecodeMessage(#[source] serde_json::Error),

    #[error("failed to encode signaling message")]
    EncodeMessage(#[source] serde_json::Error),
}
