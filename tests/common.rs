//! Test utilities & fakes shared by the integration tests.
//! Fakes stand in for the platform camera/detector capabilities and the
//! external quest source, so tests never touch real hardware or files.
#![allow(dead_code)] // Not every integration test exercises every fake.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stamprally::quests::{LoadError, Quest, QuestSource};
use stamprally::scanner::{
    CameraDevice, CameraStream, CodeDetector, DetectedCode, FacingMode, StreamHandle, VideoSink,
};

pub fn quest(name: &str, flag: &str) -> Quest {
    Quest {
        name: name.to_string(),
        description: String::new(),
        flag: flag.to_string(),
    }
}

/// Quest source that yields a fixed list.
pub struct FixedQuests(pub Vec<Quest>);

impl QuestSource for FixedQuests {
    fn fetch(&self) -> Result<Vec<Quest>, LoadError> {
        Ok(self.0.clone())
    }
}

/// Camera that always grants access and counts stream stops.
pub struct FakeCamera {
    stops: Arc<AtomicUsize>,
}

impl FakeCamera {
    /// Returns the camera and a counter of how often its streams were stopped.
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        (
            Self {
                stops: stops.clone(),
            },
            stops,
        )
    }
}

impl CameraDevice for FakeCamera {
    type Stream = FakeStream;

    async fn open(&mut self, _facing: FacingMode) -> anyhow::Result<FakeStream> {
        Ok(FakeStream {
            active: true,
            stops: self.stops.clone(),
        })
    }
}

pub struct FakeStream {
    active: bool,
    stops: Arc<AtomicUsize>,
}

impl CameraStream for FakeStream {
    fn handle(&self) -> StreamHandle {
        StreamHandle(1)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        self.active = false;
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink that is ready immediately and records its current source.
#[derive(Default)]
pub struct FakeSink {
    pub source: Option<StreamHandle>,
}

impl VideoSink for FakeSink {
    fn set_source(&mut self, source: Option<StreamHandle>) {
        self.source = source;
    }

    async fn ready(&mut self) {}

    fn play(&mut self) {}
}

/// Plays back scripted detection passes, then reports empty frames forever.
pub struct ScriptedDetector {
    passes: VecDeque<Vec<DetectedCode>>,
}

impl ScriptedDetector {
    pub fn new(passes: Vec<Vec<&str>>) -> Self {
        Self {
            passes: passes
                .into_iter()
                .map(|pass| {
                    pass.into_iter()
                        .map(|value| DetectedCode {
                            raw_value: value.to_string(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl<S: VideoSink> CodeDetector<S> for ScriptedDetector {
    async fn detect(&mut self, _sink: &S) -> anyhow::Result<Vec<DetectedCode>> {
        Ok(self.passes.pop_front().unwrap_or_default())
    }
}
