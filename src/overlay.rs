//! Skeleton geometry handed to the display sink: bone segments from
//! the fixed connection table plus markers for confident landmarks.
//! Pure data; drawing belongs to the sink.

use crate::analysis::SCORE_THRESHOLD;
use crate::geom::Point;
use crate::pose::{constants::CONNECTIONS, Keypoints};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub(crate) from: Point,
    pub(crate) to: Point,
}

/// One segment per bone connection whose both endpoints clear the
/// confidence gate.
pub(crate) fn skeleton_segments(frame: &Keypoints) -> Vec<Segment> {
    CONNECTIONS
        .iter()
        .filter_map(|&(a, b)| {
            let (start, end) = (frame[a.idx()], frame[b.idx()]);
            if start.score > SCORE_THRESHOLD && end.score > SCORE_THRESHOLD {
                Some(Segment {
                    from: start.point,
                    to: end.point,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Markers for every landmark that clears the confidence gate.
pub(crate) fn keypoint_markers(frame: &Keypoints) -> Vec<Point> {
    frame
        .iter()
        .filter(|keypoint| keypoint.score > SCORE_THRESHOLD)
        .map(|keypoint| keypoint.point)
        .collect()
}
