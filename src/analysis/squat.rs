//! Squat form analysis: depth, hip hinge, torso lean, dorsiflexion and
//! lateral knee tracking, folded into one 0-10 score per frame.

use super::{all_confident, assemble, knee, FormAssessment};
use crate::geom::{angle_between, midpoint};
use crate::pose::{keypoint, KeypointKind, Keypoints};

const REQUIRED: [KeypointKind; 8] = [
    KeypointKind::LeftHip,
    KeypointKind::RightHip,
    KeypointKind::LeftKnee,
    KeypointKind::RightKnee,
    KeypointKind::LeftAnkle,
    KeypointKind::RightAnkle,
    KeypointKind::LeftShoulder,
    KeypointKind::RightShoulder,
];

/// Synthetic floor reference: a point this far straight below the
/// ankle approximates a floor-horizontal ray for the dorsiflexion
/// proxy.
const FLOOR_DROP: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SquatAngles {
    knee: f32,
    hip: f32,
    back_lean: f32,
    ankle: f32,
}

fn side_angle(frame: &Keypoints, joints: [KeypointKind; 3]) -> f32 {
    angle_between(
        keypoint(frame, joints[0]).point,
        keypoint(frame, joints[1]).point,
        keypoint(frame, joints[2]).point,
    )
}

fn measure(frame: &Keypoints) -> SquatAngles {
    use KeypointKind::*;

    let knee = (side_angle(frame, [LeftHip, LeftKnee, LeftAnkle])
        + side_angle(frame, [RightHip, RightKnee, RightAnkle]))
        / 2.0;

    let hip = (side_angle(frame, [LeftShoulder, LeftHip, LeftKnee])
        + side_angle(frame, [RightShoulder, RightHip, RightKnee]))
        / 2.0;

    // torso lean from vertical, measured once on the shoulder/hip
    // midpoints rather than per side
    let shoulder_mid = midpoint(
        keypoint(frame, LeftShoulder).point,
        keypoint(frame, RightShoulder).point,
    );
    let hip_mid = midpoint(keypoint(frame, LeftHip).point, keypoint(frame, RightHip).point);
    let back_lean = (shoulder_mid.x() - hip_mid.x())
        .atan2(hip_mid.y() - shoulder_mid.y())
        .to_degrees()
        .abs();

    let ankle_side = |knee_kind, ankle_kind| {
        let ankle = keypoint(frame, ankle_kind).point;
        angle_between(
            keypoint(frame, knee_kind).point,
            ankle,
            ankle.offset(0.0, FLOOR_DROP),
        )
    };
    let ankle = (ankle_side(LeftKnee, LeftAnkle) + ankle_side(RightKnee, RightAnkle)) / 2.0;

    SquatAngles {
        knee,
        hip,
        back_lean,
        ankle,
    }
}

/// Classify each metric top to bottom (first satisfied branch wins)
/// and accumulate the score.
fn score(angles: &SquatAngles, tracking: Option<&knee::KneeTracking>) -> (Vec<String>, u8) {
    let mut issues = Vec::new();
    let mut score = 0;

    if angles.knee > 160.0 {
        issues.push("Start squatting".to_string());
    } else if angles.knee >= 90.0 && angles.knee <= 160.0 {
        issues.push("Go lower".to_string());
        score += 1;
    } else {
        issues.push("Great depth".to_string());
        score += 3;
    }

    if angles.hip < 45.0 {
        issues.push("⚠️ Hips too low".to_string());
    } else if angles.hip > 100.0 {
        issues.push("⚠️ Hinge at hips more".to_string());
    } else {
        score += 2;
    }

    if angles.back_lean > 45.0 {
        issues.push("⚠️ Keep chest up".to_string());
    } else if angles.back_lean < 10.0 {
        issues.push("✓ Good back position".to_string());
        score += 2;
    } else {
        score += 1;
    }

    if angles.ankle < 70.0 {
        issues.push("⚠️ Heels lifting".to_string());
    } else if angles.ankle > 110.0 {
        issues.push("⚠️ Lean Forward".to_string());
    } else {
        score += 1;
    }

    match tracking {
        Some(tracking) if tracking.is_good => score += 2,
        Some(tracking) => issues.push(tracking.issue.to_string()),
        None => {}
    }

    (issues, score)
}

pub(crate) fn analyze(frame: &Keypoints) -> Option<FormAssessment> {
    if !all_confident(frame, &REQUIRED) {
        return None;
    }

    let angles = measure(frame);
    let tracking = knee::analyze(frame);
    let (issues, score) = score(&angles, tracking.as_ref());

    let mut metrics = vec![
        format!("Knee Angle: {:.0}°", angles.knee),
        format!("Hip: {:.0}°", angles.hip),
        format!("Back Lean: {:.0}°", angles.back_lean),
        format!("Ankle: {:.0}°", angles.ankle),
    ];
    if let Some(tracking) = &tracking {
        metrics.push(format!("Knee Width: {:.2}x", tracking.ratio));
    }
    metrics.push(format!("Score: {}/10", score));

    Some(assemble(
        angles.knee > 160.0,
        "Start Squatting",
        issues,
        score,
        metrics,
    ))
}
