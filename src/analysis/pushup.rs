//! Push-up form analysis: elbow depth, scapular position, back and leg
//! straightness, plus a full-body alignment bonus.

use super::{all_confident, assemble, FormAssessment};
use crate::geom::angle_between;
use crate::pose::{keypoint, KeypointKind, Keypoints};

const REQUIRED: [KeypointKind; 12] = [
    KeypointKind::LeftShoulder,
    KeypointKind::RightShoulder,
    KeypointKind::LeftElbow,
    KeypointKind::RightElbow,
    KeypointKind::LeftWrist,
    KeypointKind::RightWrist,
    KeypointKind::LeftHip,
    KeypointKind::RightHip,
    KeypointKind::LeftKnee,
    KeypointKind::RightKnee,
    KeypointKind::LeftAnkle,
    KeypointKind::RightAnkle,
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct PushupAngles {
    elbow: f32,
    shoulder: f32,
    back: f32,
    knee: f32,
    body: f32,
}

fn side_angle(frame: &Keypoints, joints: [KeypointKind; 3]) -> f32 {
    angle_between(
        keypoint(frame, joints[0]).point,
        keypoint(frame, joints[1]).point,
        keypoint(frame, joints[2]).point,
    )
}

fn averaged(frame: &Keypoints, left: [KeypointKind; 3], right: [KeypointKind; 3]) -> f32 {
    (side_angle(frame, left) + side_angle(frame, right)) / 2.0
}

fn measure(frame: &Keypoints) -> PushupAngles {
    use KeypointKind::*;

    PushupAngles {
        elbow: averaged(
            frame,
            [LeftShoulder, LeftElbow, LeftWrist],
            [RightShoulder, RightElbow, RightWrist],
        ),
        shoulder: averaged(
            frame,
            [LeftElbow, LeftShoulder, LeftHip],
            [RightElbow, RightShoulder, RightHip],
        ),
        back: averaged(
            frame,
            [LeftShoulder, LeftHip, LeftKnee],
            [RightShoulder, RightHip, RightKnee],
        ),
        knee: averaged(
            frame,
            [LeftHip, LeftKnee, LeftAnkle],
            [RightHip, RightKnee, RightAnkle],
        ),
        // only feeds the alignment bonus point, never an issue string
        body: averaged(
            frame,
            [LeftShoulder, LeftHip, LeftAnkle],
            [RightShoulder, RightHip, RightAnkle],
        ),
    }
}

/// Classify each metric top to bottom, first satisfied branch wins.
/// The `> 200` branches cannot fire with angles averaged from [0, 180]
/// values; they are kept as written in the scoring table.
fn score(angles: &PushupAngles) -> (Vec<String>, u8) {
    let mut issues = Vec::new();
    let mut score = 0;

    if angles.elbow > 140.0 {
        issues.push("Start push-up".to_string());
    } else if angles.elbow >= 100.0 && angles.elbow <= 140.0 {
        issues.push("Go lower".to_string());
        score += 1;
    } else if angles.elbow >= 80.0 && angles.elbow < 100.0 {
        issues.push("Good depth".to_string());
        score += 2;
    } else {
        issues.push("Perfect depth".to_string());
        score += 3;
    }

    if angles.shoulder < 60.0 {
        issues.push("⚠️ Shoulders too forward".to_string());
    } else if angles.shoulder > 120.0 {
        issues.push("⚠️ Shoulders too back".to_string());
    } else if angles.shoulder >= 70.0 && angles.shoulder <= 100.0 {
        issues.push("✓ Good shoulder position".to_string());
        score += 2;
    } else {
        score += 1;
    }

    if angles.back < 160.0 {
        issues.push("⚠️ Hips sagging".to_string());
    } else if angles.back > 200.0 {
        issues.push("⚠️ Hips too high".to_string());
    } else {
        issues.push("✓ Straight back".to_string());
        score += 2;
    }

    if angles.knee < 160.0 {
        issues.push("⚠️ Knees bent".to_string());
    } else if angles.knee >= 160.0 && angles.knee <= 200.0 {
        issues.push("✓ Straight legs".to_string());
        score += 2;
    } else {
        score += 1;
    }

    if angles.body >= 165.0 && angles.body <= 195.0 {
        score += 1;
    }

    (issues, score)
}

pub(crate) fn analyze(frame: &Keypoints) -> Option<FormAssessment> {
    if !all_confident(frame, &REQUIRED) {
        return None;
    }

    let angles = measure(frame);
    let (issues, score) = score(&angles);

    let metrics = vec![
        format!("Elbow: {:.0}°", angles.elbow),
        format!("Shoulder: {:.0}°", angles.shoulder),
        format!("Back: {:.0}°", angles.back),
        format!("Knee: {:.0}°", angles.knee),
        format!("Body: {:.0}°", angles.body),
        format!("Score: {}/10", score),
    ];

    Some(assemble(
        angles.elbow > 140.0,
        "Start Push-up",
        issues,
        score,
        metrics,
    ))
}
