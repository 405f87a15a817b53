//! Console implementations of the camera and detector capabilities.
//!
//! These let the CLI exercise the full scan lifecycle without camera
//! hardware: codes are typed instead of scanned. The "camera" always grants
//! access and its stream stays active until stopped; the "sink" has nothing
//! to render and is ready immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::{CameraDevice, CameraStream, CodeDetector, DetectedCode, FacingMode, StreamHandle, VideoSink};

/// Always-granted camera whose stream stays active until stopped.
#[derive(Default)]
pub struct ConsoleCamera;

pub struct ConsoleStream {
    active: Arc<AtomicBool>,
}

impl CameraDevice for ConsoleCamera {
    type Stream = ConsoleStream;

    async fn open(&mut self, _facing: FacingMode) -> anyhow::Result<ConsoleStream> {
        Ok(ConsoleStream {
            active: Arc::new(AtomicBool::new(true)),
        })
    }
}

impl CameraStream for ConsoleStream {
    fn handle(&self) -> StreamHandle {
        StreamHandle(0)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Sink with nothing to render; ready as soon as it is asked.
#[derive(Default)]
pub struct ConsoleSink {
    source: Option<StreamHandle>,
}

impl VideoSink for ConsoleSink {
    fn set_source(&mut self, source: Option<StreamHandle>) {
        self.source = source;
    }

    async fn ready(&mut self) {}

    fn play(&mut self) {}
}

/// Reads one line from stdin per detection pass. An empty line counts as
/// "no code in this frame"; closed input is a detector failure.
pub struct LineDetector {
    lines: Lines<BufReader<Stdin>>,
}

impl LineDetector {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for LineDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: VideoSink> CodeDetector<S> for LineDetector {
    async fn detect(&mut self, _sink: &S) -> anyhow::Result<Vec<DetectedCode>> {
        match self
            .lines
            .next_line()
            .await
            .context("reading code from stdin")?
        {
            Some(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    Ok(Vec::new())
                } else {
                    Ok(vec![DetectedCode {
                        raw_value: trimmed.to_string(),
                    }])
                }
            }
            None => bail!("input closed before a code was entered"),
        }
    }
}

/// Detector that "finds" a fixed code on its first pass. Backs the
/// `scan --code` flag and non-interactive use.
pub struct PresetDetector {
    code: Option<String>,
}

impl PresetDetector {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
        }
    }
}

impl<S: VideoSink> CodeDetector<S> for PresetDetector {
    async fn detect(&mut self, _sink: &S) -> anyhow::Result<Vec<DetectedCode>> {
        match self.code.take() {
            Some(raw_value) => Ok(vec![DetectedCode { raw_value }]),
            None => bail!("preset code already consumed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{run_scan, CancelToken, ScanOptions};

    #[tokio::test]
    async fn preset_detector_drives_a_full_session() {
        let mut camera = ConsoleCamera;
        let mut sink = ConsoleSink::default();
        let mut detector = PresetDetector::new("RALLY-01");
        let token = CancelToken::new();

        let result = run_scan(
            &mut camera,
            &mut sink,
            &mut detector,
            &token,
            &ScanOptions::default(),
        )
        .await
        .expect("scan");

        assert_eq!(result.as_deref(), Some("RALLY-01"));
    }

    #[tokio::test]
    async fn console_stream_reports_inactive_after_stop() {
        let mut camera = ConsoleCamera;
        let mut stream = camera.open(FacingMode::Environment).await.expect("open");
        assert!(stream.is_active());
        stream.stop();
        assert!(!stream.is_active());
    }
}
