use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use num_traits::FromPrimitive;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use structopt::StructOpt;
use tracing::{debug, info, trace, warn};
use tracing_subscriber::layer::SubscriberExt;

mod analysis;
mod engine;
mod error;
mod geom;
mod overlay;
mod pose;
mod session;
mod signal;

use analysis::{ExerciseKind, FeedbackState};
use engine::{Coach, DisplaySink, PoseSource};
use error::Error;
use geom::Point;
use pose::{Keypoint, KeypointKind, Keypoints, Pose, NUM_KEYPOINTS};
use session::{SessionStore, StaticSession};

/// Raw landmark as recorded in a trace file: same shape the pose
/// estimator emits.
#[derive(Debug, serde::Deserialize)]
struct TraceKeypoint {
    x: f32,
    y: f32,
    score: f32,
}

/// One recorded frame: zero or more detected poses of 17 keypoints.
type TraceFrame = Vec<Vec<TraceKeypoint>>;

fn build_pose(raw: Vec<TraceKeypoint>) -> Result<Pose, Error> {
    if raw.len() != NUM_KEYPOINTS {
        return Err(Error::KeypointCount {
            expected: NUM_KEYPOINTS,
            actual: raw.len(),
        });
    }

    let mut keypoints: Keypoints = Default::default();
    let mut total_score = 0.0;
    for (index, keypoint) in raw.into_iter().enumerate() {
        let kind =
            KeypointKind::from_usize(index).ok_or(Error::ConvertUSizeToKeypointKind(index))?;
        keypoints[index] = Keypoint {
            kind: Some(kind),
            point: Point::new(keypoint.x, keypoint.y)?,
            score: keypoint.score,
        };
        total_score += keypoint.score;
    }

    Ok(Pose {
        keypoints,
        score: total_score / NUM_KEYPOINTS as f32,
    })
}

/// Pose source replaying a recorded keypoint trace. Stands in for the
/// live estimator; the driver cannot tell the difference.
struct RecordedSource {
    frames: std::vec::IntoIter<Vec<Pose>>,
}

impl RecordedSource {
    fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::OpenTrace(e, path.to_owned()))?;
        let raw: Vec<TraceFrame> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::ParseTrace(e, path.to_owned()))?;

        let frames = raw
            .into_iter()
            .map(|frame| frame.into_iter().map(build_pose).collect())
            .collect::<Result<Vec<Vec<Pose>>, Error>>()?;

        info!(message = "loaded pose trace", frames = frames.len());
        Ok(Self {
            frames: frames.into_iter(),
        })
    }
}

impl PoseSource for RecordedSource {
    fn next_frame(&mut self) -> Result<Option<Vec<Pose>>, Error> {
        Ok(self.frames.next())
    }
}

/// Display sink writing feedback to the log, or to a live spinner when
/// requested.
struct ConsoleSink {
    spinner: Option<ProgressBar>,
}

impl DisplaySink for ConsoleSink {
    fn show_feedback(&mut self, text: &str, state: Option<FeedbackState>) {
        let tag = state.map(|s| s.to_string()).unwrap_or_default();
        match &self.spinner {
            Some(spinner) => {
                spinner.set_message(format!("[{}] {}", tag, text));
                spinner.inc(1);
            }
            None => info!(message = "feedback", text = %text, state = %tag),
        }
    }

    fn show_metrics(&mut self, metrics: &[String]) {
        debug!(metrics = %metrics.join(" | "));
    }

    fn draw_skeleton(&mut self, segments: &[overlay::Segment], markers: &[Point]) {
        trace!(segments = segments.len(), markers = markers.len());
    }
}

/// In-process signaling channel standing in for a connected peer:
/// payloads are serialized exactly as they would cross the wire, then
/// handed straight back to the local "coach" side.
#[derive(Default)]
struct LoopbackChannel {
    inbox: Vec<String>,
}

impl signal::SignalChannel for LoopbackChannel {
    fn send(&mut self, message: &signal::Message) -> bool {
        match message.encode() {
            Ok(payload) => {
                self.inbox.push(payload);
                true
            }
            Err(_) => false,
        }
    }
}

/// Coach-dashboard side of the help flow: validate each payload at the
/// boundary and surface HELP notifications.
fn notify_coach(inbox: &[String]) {
    for payload in inbox {
        match signal::Message::decode(payload) {
            Ok(signal::Message::Help { msg }) => info!(message = "coach notified", notification = %msg),
            Ok(other) => debug!(message = "ignoring non-help signal", signal = ?other),
            Err(error) => warn!(message = "dropped malformed signaling payload", error = %error),
        }
    }
}

#[derive(structopt::StructOpt)]
struct Opt {
    /// Path to a recorded keypoint trace (JSON: frames of poses of 17
    /// {x, y, score} objects).
    #[structopt(required = true)]
    trace: PathBuf,

    /// Exercise to coach: squat or pushup.
    #[structopt(short, long, default_value = "squat")]
    exercise: ExerciseKind,

    /// Target analysis rate in frames per second.
    #[structopt(short, long, default_value = "30")]
    fps: u32,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    /// Send a help request to the remote coach when the session ends.
    #[structopt(long)]
    call_coach: bool,

    #[structopt(short, long)]
    show_progress: bool,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();
    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let session = StaticSession::new(opt.exercise);
    let exercise = session.current_exercise();
    info!(message = "starting coaching session", exercise = %exercise, fps = opt.fps);

    let source = RecordedSource::open(&opt.trace).context("failed opening pose source")?;

    let spinner = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let mut coach = Coach::new(source, ConsoleSink { spinner }, exercise, opt.fps);
    let timing = coach.run(&running).context("coaching session failed")?;

    info!(
        message = "session finished",
        frames = timing.frames,
        estimate = ?timing.estimate,
        analysis = ?timing.analysis,
    );

    if opt.call_coach {
        let mut channel = LoopbackChannel::default();
        if signal::request_help(&mut channel, exercise) {
            notify_coach(&channel.inbox);
        } else {
            warn!("help request not delivered: no coach connected");
        }
    }

    Ok(())
}
