//! Per-exercise rule engines. Each analyzer is a pure function of one
//! keypoint frame: it confidence-gates the landmarks it needs, derives
//! a fixed set of joint angles, classifies each into an issue/score
//! bucket and aggregates the result. A gated frame yields `None`
//! (inconclusive), never an error.

use crate::error::Error;
use crate::pose::{KeypointKind, Keypoints};
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

pub(crate) mod knee;
pub(crate) mod pushup;
pub(crate) mod squat;

/// Minimum landmark confidence; gates use a strict `>` comparison.
pub(crate) const SCORE_THRESHOLD: f32 = 0.3;

/// Form score at or above which the frame counts as perfect.
const GOOD_SCORE: u8 = 9;

const PERFECT_FORM: &str = "🏆 Perfect Form!";

/// Display tag for the top-level feedback, recomputed fresh every
/// frame from the current metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedbackState {
    Start,
    InProgress,
    Good,
}

impl fmt::Display for FeedbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedbackState::Start => "start",
            FeedbackState::InProgress => "lower",
            FeedbackState::Good => "good",
        })
    }
}

/// Per-frame output of an exercise analyzer. Ephemeral: built and
/// displayed within one frame cycle, never retained.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FormAssessment {
    pub(crate) feedback: String,
    pub(crate) state: FeedbackState,
    pub(crate) issues: Vec<String>,
    pub(crate) score: u8,
    pub(crate) metrics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExerciseKind {
    Squat,
    Pushup,
}

impl ExerciseKind {
    /// Dispatch one frame to the active exercise's analyzer.
    pub(crate) fn analyze(self, frame: &Keypoints) -> Option<FormAssessment> {
        match self {
            ExerciseKind::Squat => squat::analyze(frame),
            ExerciseKind::Pushup => pushup::analyze(frame),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
        })
    }
}

impl FromStr for ExerciseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "squat" => Ok(ExerciseKind::Squat),
            "pushup" => Ok(ExerciseKind::Pushup),
            other => Err(Error::ParseExerciseKind(other.to_string())),
        }
    }
}

/// True when every listed landmark clears the confidence gate.
fn all_confident(frame: &Keypoints, required: &[KeypointKind]) -> bool {
    required
        .iter()
        .all(|&kind| frame[kind.idx()].score > SCORE_THRESHOLD)
}

/// Assemble the top-level feedback from the accumulated issue list.
/// The start-pose override wins over everything; a score at or above
/// the perfect threshold overrides the issues; otherwise the issues
/// are joined, with a generic fallback when the list is empty.
fn assemble(
    start_override: bool,
    start_text: &str,
    issues: Vec<String>,
    score: u8,
    metrics: Vec<String>,
) -> FormAssessment {
    let (feedback, state) = if start_override {
        (start_text.to_string(), FeedbackState::Start)
    } else if score >= GOOD_SCORE {
        (PERFECT_FORM.to_string(), FeedbackState::Good)
    } else if issues.is_empty() {
        ("Keep going!".to_string(), FeedbackState::InProgress)
    } else {
        (issues.iter().join(" • "), FeedbackState::InProgress)
    };

    FormAssessment {
        feedback,
        state,
        issues,
        score,
        metrics,
    }
}
