//! Frame pipeline driver: rate-limits the pose source, dispatches each
//! frame to the active analyzer and hands overlay/feedback data to the
//! display sink. The analyzers themselves are pure; all clock and I/O
//! concerns live here.

use crate::analysis::{ExerciseKind, FeedbackState, FormAssessment};
use crate::error::Error;
use crate::geom::Point;
use crate::overlay::{self, Segment};
use crate::pose::Pose;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

pub(crate) const NO_POSE_FEEDBACK: &str = "No pose detected - step back";

/// Upstream pose estimator boundary. `Ok(None)` means the source is
/// closed (end of session); `Ok(Some(vec![]))` means no person was
/// detected in an otherwise healthy frame.
pub(crate) trait PoseSource {
    fn next_frame(&mut self) -> Result<Option<Vec<Pose>>, Error>;
}

/// Rendering boundary. Receives feedback text with its state tag, the
/// ordered metrics list, and skeleton geometry for the overlay.
pub(crate) trait DisplaySink {
    fn show_feedback(&mut self, text: &str, state: Option<FeedbackState>);
    fn show_metrics(&mut self, metrics: &[String]);
    fn draw_skeleton(&mut self, segments: &[Segment], markers: &[Point]);
}

/// Soft real-time cadence gate. The reference time advances by the
/// elapsed time modulo the interval instead of resetting to "now", so
/// the cadence does not drift over long runs. The most recent frame
/// always wins; nothing is queued.
pub(crate) struct FrameLimiter {
    interval: Duration,
    last: Option<Duration>,
}

impl FrameLimiter {
    pub(crate) fn new(target_fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            last: None,
        }
    }

    pub(crate) fn ready(&mut self, now: Duration) -> bool {
        let last = match self.last {
            None => {
                self.last = Some(now);
                return true;
            }
            Some(last) => last,
        };

        let elapsed = match now.checked_sub(last) {
            Some(elapsed) if elapsed >= self.interval => elapsed,
            _ => return false,
        };

        let phase = Duration::from_nanos((elapsed.as_nanos() % self.interval.as_nanos()) as u64);
        self.last = Some(now - phase);
        true
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Timing {
    pub(crate) estimate: Duration,
    pub(crate) analysis: Duration,
    pub(crate) frames: usize,
}

/// Outcome of one driver tick, mostly for observability and tests.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TickOutcome {
    /// Called before the next frame slot opened; deferred.
    Throttled,
    /// The pose source ended the session.
    Closed,
    /// Healthy frame, nobody in it.
    NoPose,
    /// Required landmarks failed the confidence gate; the previously
    /// displayed state persists.
    Inconclusive,
    Assessed(FormAssessment),
}

pub(crate) struct Coach<S, D> {
    source: S,
    display: D,
    exercise: ExerciseKind,
    limiter: FrameLimiter,
    timing: Timing,
}

impl<S, D> Coach<S, D>
where
    S: PoseSource,
    D: DisplaySink,
{
    pub(crate) fn new(source: S, display: D, exercise: ExerciseKind, target_fps: u32) -> Self {
        Self {
            source,
            display,
            exercise,
            limiter: FrameLimiter::new(target_fps),
            timing: Timing::default(),
        }
    }

    /// Process at most one frame at time `now` on the session clock.
    pub(crate) fn tick(&mut self, now: Duration) -> Result<TickOutcome, Error> {
        if !self.limiter.ready(now) {
            return Ok(TickOutcome::Throttled);
        }

        let started = Instant::now();
        let poses = match self.source.next_frame()? {
            Some(poses) => poses,
            None => return Ok(TickOutcome::Closed),
        };
        self.timing.estimate += started.elapsed();
        self.timing.frames += 1;

        let pose = match poses.first() {
            Some(pose) => pose,
            None => {
                self.display.show_feedback(NO_POSE_FEEDBACK, None);
                return Ok(TickOutcome::NoPose);
            }
        };

        trace!(message = "analyzing pose", pose_score = pose.score);
        self.display.draw_skeleton(
            &overlay::skeleton_segments(&pose.keypoints),
            &overlay::keypoint_markers(&pose.keypoints),
        );

        let started = Instant::now();
        let assessment = self.exercise.analyze(&pose.keypoints);
        self.timing.analysis += started.elapsed();

        match assessment {
            Some(assessment) => {
                self.display
                    .show_feedback(&assessment.feedback, Some(assessment.state));
                self.display.show_metrics(&assessment.metrics);
                Ok(TickOutcome::Assessed(assessment))
            }
            None => Ok(TickOutcome::Inconclusive),
        }
    }

    /// Drive ticks off a monotonic clock until the source closes or
    /// `running` is cleared. A frame already in flight completes and
    /// its result is discarded with the loop.
    pub(crate) fn run(&mut self, running: &AtomicBool) -> Result<Timing, Error> {
        let clock = Instant::now();
        while running.load(Ordering::SeqCst) {
            match self.tick(clock.elapsed())? {
                TickOutcome::Throttled => thread::sleep(Duration::from_millis(1)),
                TickOutcome::Closed => break,
                _ => {}
            }
        }
        Ok(self.timing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testutil::frame_from;
    use crate::pose::{Keypoints, KeypointKind};

    #[test]
    fn first_call_is_always_ready() {
        let mut limiter = FrameLimiter::new(30);
        assert!(limiter.ready(Duration::from_millis(5)));
        assert!(!limiter.ready(Duration::from_millis(10)));
    }

    #[test]
    fn limiter_holds_target_rate_without_phase_drift() {
        let mut limiter = FrameLimiter::new(30);
        let interval = Duration::from_secs_f64(1.0 / 30.0);

        let mut invocations = 0u32;
        let mut first = None;
        let mut last = Duration::default();
        for step in 1..=1000u64 {
            let now = Duration::from_millis(step * 5);
            if limiter.ready(now) {
                invocations += 1;
                first.get_or_insert(now);
                last = now;
            }
        }

        // invocation count tracks elapsed/interval within rounding
        let elapsed = last - first.unwrap();
        let expected = (elapsed.as_secs_f64() / interval.as_secs_f64()).round() as u32;
        assert!(
            (i64::from(invocations) - 1 - i64::from(expected)).abs() <= 1,
            "{} invocations vs {} expected",
            invocations,
            expected
        );
        // never more than one invocation per ~33ms window
        assert!(invocations <= 151, "{} invocations", invocations);
        assert!(invocations >= 148, "{} invocations", invocations);
    }

    struct ScriptedSource {
        frames: Vec<Option<Vec<Pose>>>,
    }

    impl PoseSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<Vec<Pose>>, Error> {
            if self.frames.is_empty() {
                Ok(None)
            } else {
                Ok(self.frames.remove(0))
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        feedback: Vec<(String, Option<FeedbackState>)>,
        metrics: Vec<Vec<String>>,
        skeletons: usize,
    }

    impl DisplaySink for RecordingSink {
        fn show_feedback(&mut self, text: &str, state: Option<FeedbackState>) {
            self.feedback.push((text.to_string(), state));
        }

        fn show_metrics(&mut self, metrics: &[String]) {
            self.metrics.push(metrics.to_vec());
        }

        fn draw_skeleton(&mut self, _segments: &[Segment], _markers: &[Point]) {
            self.skeletons += 1;
        }
    }

    fn standing_squat_frame() -> Keypoints {
        use KeypointKind::*;
        frame_from(
            &[
                (LeftShoulder, -20.0, 0.0),
                (RightShoulder, 20.0, 0.0),
                (LeftHip, -18.0, 80.0),
                (RightHip, 18.0, 80.0),
                (LeftKnee, -18.0, 160.0),
                (RightKnee, 18.0, 160.0),
                (LeftAnkle, -18.0, 240.0),
                (RightAnkle, 18.0, 240.0),
            ],
            0.9,
        )
    }

    fn pose_with(keypoints: Keypoints) -> Pose {
        Pose {
            keypoints,
            score: 0.9,
        }
    }

    #[test]
    fn driver_walks_through_all_frame_outcomes() {
        let low_confidence = frame_from(&[], 0.0);
        let source = ScriptedSource {
            frames: vec![
                Some(vec![]),
                Some(vec![pose_with(low_confidence)]),
                Some(vec![pose_with(standing_squat_frame())]),
            ],
        };
        let mut coach = Coach::new(source, RecordingSink::default(), ExerciseKind::Squat, 30);

        // ticks spaced far beyond the interval so none throttle
        assert_eq!(
            coach.tick(Duration::from_millis(100)).unwrap(),
            TickOutcome::NoPose
        );
        assert_eq!(
            coach.tick(Duration::from_millis(200)).unwrap(),
            TickOutcome::Inconclusive
        );
        match coach.tick(Duration::from_millis(300)).unwrap() {
            TickOutcome::Assessed(assessment) => {
                assert_eq!(assessment.feedback, "Start Squatting");
            }
            other => panic!("expected assessment, got {:?}", other),
        }
        assert_eq!(
            coach.tick(Duration::from_millis(400)).unwrap(),
            TickOutcome::Closed
        );

        let sink = &coach.display;
        assert_eq!(sink.feedback.len(), 2); // no-pose notice + assessment
        assert_eq!(sink.feedback[0].0, NO_POSE_FEEDBACK);
        assert_eq!(sink.feedback[0].1, None);
        assert_eq!(sink.feedback[1].1, Some(FeedbackState::Start));
        assert_eq!(sink.metrics.len(), 1);
        assert_eq!(sink.skeletons, 2); // low-confidence pose still drawn
        assert_eq!(coach.timing.frames, 3);
    }

    #[test]
    fn early_ticks_are_throttled_not_queued() {
        let source = ScriptedSource {
            frames: vec![
                Some(vec![pose_with(standing_squat_frame())]),
                Some(vec![pose_with(standing_squat_frame())]),
            ],
        };
        let mut coach = Coach::new(source, RecordingSink::default(), ExerciseKind::Squat, 30);

        assert!(matches!(
            coach.tick(Duration::from_millis(5)).unwrap(),
            TickOutcome::Assessed(_)
        ));
        // 10ms later: inside the 33ms window, the source must not be hit
        assert_eq!(
            coach.tick(Duration::from_millis(15)).unwrap(),
            TickOutcome::Throttled
        );
        assert_eq!(coach.timing.frames, 1);
        assert!(matches!(
            coach.tick(Duration::from_millis(50)).unwrap(),
            TickOutcome::Assessed(_)
        ));
    }
}
