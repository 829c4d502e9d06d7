//! Lateral knee-tracking check shared by the squat analyzer: compares
//! the knee gap against hip width to catch valgus collapse or an
//! over-wide stance.

use super::all_confident;
use crate::pose::{keypoint, KeypointKind, Keypoints};

const REQUIRED: [KeypointKind; 4] = [
    KeypointKind::LeftKnee,
    KeypointKind::RightKnee,
    KeypointKind::LeftHip,
    KeypointKind::RightHip,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    None,
    Medium,
    High,
}

/// Transient per-frame result; feeds the squat aggregate score.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KneeTracking {
    pub(crate) issue: &'static str,
    pub(crate) severity: Severity,
    pub(crate) ratio: f32,
    pub(crate) is_good: bool,
}

/// `None` means inconclusive (a required landmark failed the gate);
/// callers must omit the check from aggregate scoring, not treat it
/// as good form.
pub(crate) fn analyze(frame: &Keypoints) -> Option<KneeTracking> {
    if !all_confident(frame, &REQUIRED) {
        return None;
    }

    let knee_distance = keypoint(frame, KeypointKind::LeftKnee)
        .point
        .distance(keypoint(frame, KeypointKind::RightKnee).point);
    let hip_width = keypoint(frame, KeypointKind::LeftHip)
        .point
        .distance(keypoint(frame, KeypointKind::RightHip).point);
    let ratio = knee_distance / hip_width;

    // first match wins
    Some(if ratio < 0.85 {
        KneeTracking {
            issue: "⚠️ Knees caving in",
            severity: Severity::High,
            ratio,
            is_good: false,
        }
    } else if ratio > 1.5 {
        KneeTracking {
            issue: "⚠️ Stance too wide",
            severity: Severity::Medium,
            ratio,
            is_good: false,
        }
    } else {
        KneeTracking {
            issue: "✓ Good knee tracking",
            severity: Severity::None,
            ratio,
            is_good: true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testutil::{degrade, frame_from};
    use assert_approx_eq::assert_approx_eq;

    /// Hips 40 apart, knees `40 * ratio` apart, everything confident.
    fn frame_with_ratio(ratio: f32) -> Keypoints {
        let knee_x = 20.0 * ratio;
        frame_from(
            &[
                (KeypointKind::LeftHip, -20.0, 0.0),
                (KeypointKind::RightHip, 20.0, 0.0),
                (KeypointKind::LeftKnee, -knee_x, 80.0),
                (KeypointKind::RightKnee, knee_x, 80.0),
            ],
            0.9,
        )
    }

    #[test]
    fn caving_below_lower_bound() {
        let result = analyze(&frame_with_ratio(0.84)).unwrap();
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.issue, "⚠️ Knees caving in");
        assert!(!result.is_good);
        assert_approx_eq!(result.ratio, 0.84, 1e-4);
    }

    #[test]
    fn lower_bound_is_exclusive() {
        let result = analyze(&frame_with_ratio(0.85)).unwrap();
        assert_ne!(result.severity, Severity::High);
        assert!(result.is_good);
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let result = analyze(&frame_with_ratio(1.5)).unwrap();
        assert!(result.is_good);
        assert_eq!(result.severity, Severity::None);
    }

    #[test]
    fn too_wide_above_upper_bound() {
        let result = analyze(&frame_with_ratio(1.6)).unwrap();
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.issue, "⚠️ Stance too wide");
        assert!(!result.is_good);
    }

    #[test]
    fn unit_ratio_tracks_well() {
        let result = analyze(&frame_with_ratio(1.0)).unwrap();
        assert!(result.is_good);
        assert_eq!(result.issue, "✓ Good knee tracking");
        assert_approx_eq!(result.ratio, 1.0, 1e-4);
    }

    #[test]
    fn each_required_landmark_gates_the_result() {
        for &kind in &super::REQUIRED {
            let mut frame = frame_with_ratio(1.0);
            degrade(&mut frame, kind);
            assert!(analyze(&frame).is_none(), "{:?} should gate", kind);
        }
    }
}
