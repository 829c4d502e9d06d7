use crate::geom::Point;

/// Number of landmarks in a single-person keypoint frame.
pub(crate) const NUM_KEYPOINTS: usize = 17;

/// Named body landmarks in the fixed MoveNet index order. The
/// index→body-part mapping is constant for the lifetime of the system.
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive)]
pub(crate) enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointKind {
    #[inline]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }
}

/// A single detected landmark: position in source-frame pixel
/// coordinates plus detector confidence in [0, 1].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct Keypoint {
    pub(crate) kind: Option<KeypointKind>,
    pub(crate) point: Point,
    pub(crate) score: f32,
}

pub(crate) type Keypoints = [Keypoint; NUM_KEYPOINTS];

/// One estimated person: a full keypoint frame plus overall confidence.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Pose {
    pub(crate) keypoints: Keypoints,
    pub(crate) score: f32,
}

/// Look up a landmark in a frame by kind.
#[inline]
pub(crate) fn keypoint(frame: &Keypoints, kind: KeypointKind) -> Keypoint {
    frame[kind.idx()]
}

pub(crate) mod constants {
    use super::KeypointKind::{self, *};

    /// Bone connections drawn by the overlay: arms, torso, legs, face.
    pub(crate) const CONNECTIONS: [(KeypointKind, KeypointKind); 16] = [
        // arms
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        // torso
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        // legs
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
        // face
        (Nose, LeftEye),
        (Nose, RightEye),
        (LeftEye, LeftEar),
        (RightEye, RightEar),
    ];
}
