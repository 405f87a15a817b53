//! Scan session: acquire a camera stream, poll a code detector until a code
//! is decoded, and release the camera on every exit path.
//!
//! The camera and detector are platform capabilities modeled as traits; the
//! session knows nothing about quests. It resolves with the first decoded
//! string, with `None` when cancelled or the stream dies (a normal outcome),
//! or fails when camera access or detection itself fails.

pub mod console;

mod cancel;
pub use cancel::CancelToken;

use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;
use tokio::time::{sleep, timeout};

/// Opaque token identifying a live camera stream. The video sink consumes it
/// without knowing anything about the underlying transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHandle(pub u64);

/// Camera selection hint. Hunts prefer the rear-facing camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

/// One decoded machine-readable code.
#[derive(Debug, Clone)]
pub struct DetectedCode {
    pub raw_value: String,
}

/// Terminal scan session failures. Expected outcomes (a decode, or "no
/// result" after cancellation) are not errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Camera permission denied or no camera hardware. Terminal for this
    /// session; the user may retry by starting a new one.
    #[error("camera access failed: {0}")]
    CameraAccess(#[source] anyhow::Error),

    /// The detector itself failed mid-scan.
    #[error("code detection failed: {0}")]
    Detection(#[source] anyhow::Error),

    /// The video sink never reported it was ready to play.
    #[error("video sink not ready after {0:?}")]
    ReadyTimeout(Duration),
}

/// Camera capability: produces live streams on request.
#[allow(async_fn_in_trait)]
pub trait CameraDevice {
    type Stream: CameraStream;

    async fn open(&mut self, facing: FacingMode) -> anyhow::Result<Self::Stream>;
}

/// A live camera stream. `stop` releases the underlying hardware; the
/// session guarantees it is called exactly once per session.
pub trait CameraStream {
    fn handle(&self) -> StreamHandle;
    fn is_active(&self) -> bool;
    fn stop(&mut self);
}

/// Video rendering target, opaque to the session beyond attach, ready, play.
#[allow(async_fn_in_trait)]
pub trait VideoSink {
    fn set_source(&mut self, source: Option<StreamHandle>);

    /// Resolves once the sink has enough data to begin playback.
    async fn ready(&mut self);

    fn play(&mut self);
}

/// Code detector capability: one detection pass over the sink's current
/// frame, returning zero or more decoded codes.
#[allow(async_fn_in_trait)]
pub trait CodeDetector<S: VideoSink> {
    async fn detect(&mut self, sink: &S) -> anyhow::Result<Vec<DetectedCode>>;
}

/// Tuning knobs for the scan loop.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Pause between detection passes when nothing was found.
    pub frame_interval: Duration,
    /// How long to wait for the sink to become ready; `None` waits forever.
    pub ready_timeout: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            ready_timeout: Some(Duration::from_secs(10)),
        }
    }
}

enum Primed {
    Playable,
    TimedOut(Duration),
    Cancelled,
}

/// Run one scan session.
///
/// Acquires the camera (rear-facing preferred), attaches the stream to the
/// sink, waits for the sink to be playable, then polls the detector once per
/// frame interval until a code is found, the token fires, the stream dies,
/// or detection fails. Resolves `Ok(None)` on cancellation or a dead stream.
/// When several codes appear in one pass, the first in detector-reported
/// order wins.
///
/// On every exit path the stream is stopped and the sink source cleared,
/// exactly once.
pub async fn run_scan<C, S, D>(
    camera: &mut C,
    sink: &mut S,
    detector: &mut D,
    token: &CancelToken,
    options: &ScanOptions,
) -> Result<Option<String>, ScanError>
where
    C: CameraDevice,
    S: VideoSink,
    D: CodeDetector<S>,
{
    let mut stream = camera
        .open(FacingMode::Environment)
        .await
        .map_err(ScanError::CameraAccess)?;
    sink.set_source(Some(stream.handle()));

    // Priming: a one-time suspension point, bounded only when a timeout is
    // configured. Cancellation here releases the camera too.
    let primed = {
        let waiting = wait_ready(sink, options.ready_timeout);
        tokio::select! {
            _ = token.cancelled() => Primed::Cancelled,
            outcome = waiting => outcome,
        }
    };
    match primed {
        Primed::Cancelled => {
            teardown(&mut stream, sink);
            return Ok(None);
        }
        Primed::TimedOut(limit) => {
            teardown(&mut stream, sink);
            return Err(ScanError::ReadyTimeout(limit));
        }
        Primed::Playable => sink.play(),
    }

    loop {
        if token.is_cancelled() || !stream.is_active() {
            debug!("scan stopped before a decode (cancelled or stream inactive)");
            teardown(&mut stream, sink);
            return Ok(None);
        }

        let pass = tokio::select! {
            _ = token.cancelled() => None,
            result = detector.detect(&*sink) => Some(result),
        };

        match pass {
            None => {
                teardown(&mut stream, sink);
                return Ok(None);
            }
            Some(Ok(codes)) => {
                if let Some(first) = codes.into_iter().next() {
                    teardown(&mut stream, sink);
                    return Ok(Some(first.raw_value));
                }
            }
            Some(Err(err)) => {
                warn!("detector failed mid-scan: {err:#}");
                teardown(&mut stream, sink);
                return Err(ScanError::Detection(err));
            }
        }

        // Nothing in this frame; yield until the next one.
        tokio::select! {
            _ = token.cancelled() => {
                teardown(&mut stream, sink);
                return Ok(None);
            }
            _ = sleep(options.frame_interval) => {}
        }
    }
}

async fn wait_ready<S: VideoSink>(sink: &mut S, limit: Option<Duration>) -> Primed {
    match limit {
        Some(limit) => match timeout(limit, sink.ready()).await {
            Ok(()) => Primed::Playable,
            Err(_) => Primed::TimedOut(limit),
        },
        None => {
            sink.ready().await;
            Primed::Playable
        }
    }
}

fn teardown<T: CameraStream, S: VideoSink>(stream: &mut T, sink: &mut S) {
    stream.stop();
    sink.set_source(None);
}
