//! Replay backend: drives a session from a recorded detector stream.
//!
//! A recording is JSONL, one frame per line:
//!
//! ```text
//! # optional comment lines
//! {"t": 0.0, "poses": []}
//! {"t": 33.3, "poses": [[{"x": 0.45, "y": 0.52, "z": 0.0, "visibility": 0.98}, ...]]}
//! ```
//!
//! Frames carry their recorded timestamps, so cue timing in a replay
//! matches the live session it was captured from.

use std::path::Path;
use std::sync::Arc;

use kneecue_common::clock::SessionClock;
use kneecue_common::config::{CameraConstraints, DetectorOptions};
use kneecue_common::error::{KneecueError, KneecueResult};
use kneecue_pose_model::landmark::{parse_detections, DetectionRecord, DetectorOutput, POSE_LANDMARK_COUNT};

use crate::backend::{
    CaptureBackend, FrameSource, LandmarkDetector, NullRenderer, SkeletonRenderer, VideoFrame,
};

/// Backend that plays back a recorded detector stream.
pub struct ReplayBackend {
    records: Arc<Vec<DetectionRecord>>,
    frame_size: (u32, u32),
    realtime: bool,
}

impl ReplayBackend {
    pub fn new(records: Vec<DetectionRecord>) -> KneecueResult<Self> {
        if records.is_empty() {
            return Err(KneecueError::replay("recording contains no frames"));
        }
        Ok(Self {
            records: Arc::new(records),
            frame_size: (640, 480),
            realtime: false,
        })
    }

    /// Parse a JSONL recording.
    pub fn from_jsonl(content: &str) -> KneecueResult<Self> {
        let records = parse_detections(content)
            .map_err(|e| KneecueError::replay(format!("invalid recording: {e}")))?;
        Self::new(records)
    }

    /// Load a JSONL recording from disk.
    pub fn from_file(path: &Path) -> KneecueResult<Self> {
        if !path.exists() {
            return Err(KneecueError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let backend = Self::from_jsonl(&content)?;
        tracing::info!(
            path = %path.display(),
            frames = backend.len(),
            duration_ms = backend.duration_ms(),
            "Loaded recording"
        );
        Ok(backend)
    }

    /// Deliver frames no faster than their recorded timestamps.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time between the first and last recorded frame.
    pub fn duration_ms(&self) -> f64 {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ReplayBackend {
    async fn load_detector(
        &mut self,
        _options: &DetectorOptions,
    ) -> KneecueResult<Box<dyn LandmarkDetector>> {
        Ok(Box::new(ReplayDetector {
            records: self.records.clone(),
        }))
    }

    async fn open_camera(
        &mut self,
        _constraints: &CameraConstraints,
    ) -> KneecueResult<Box<dyn FrameSource>> {
        Ok(Box::new(ReplaySource {
            records: self.records.clone(),
            frame_size: self.frame_size,
            realtime: self.realtime,
            clock: None,
            cursor: 0,
            released: false,
        }))
    }

    fn attach_render_target(&mut self, target_id: &str) -> KneecueResult<Box<dyn SkeletonRenderer>> {
        Ok(Box::new(NullRenderer::new(target_id)))
    }

    fn name(&self) -> &str {
        "replay"
    }
}

struct ReplaySource {
    records: Arc<Vec<DetectionRecord>>,
    frame_size: (u32, u32),
    realtime: bool,
    clock: Option<SessionClock>,
    cursor: usize,
    released: bool,
}

#[async_trait::async_trait]
impl FrameSource for ReplaySource {
    async fn next_frame(&mut self) -> KneecueResult<Option<VideoFrame>> {
        if self.released {
            return Err(KneecueError::camera("recording already released"));
        }
        let Some(record) = self.records.get(self.cursor) else {
            return Ok(None);
        };

        if self.realtime {
            let first_ms = self.records.first().map_or(0.0, |r| r.timestamp_ms);
            let clock = self.clock.get_or_insert_with(SessionClock::start);
            let ahead_ms = (record.timestamp_ms - first_ms) - clock.elapsed_ms();
            tokio::time::sleep(SessionClock::ms_to_duration(ahead_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }

        let (width, height) = self.frame_size;
        let frame = VideoFrame::empty(self.cursor as u64, record.timestamp_ms, width, height);
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frame_size
    }

    async fn release(&mut self) -> KneecueResult<()> {
        self.released = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

struct ReplayDetector {
    records: Arc<Vec<DetectionRecord>>,
}

#[async_trait::async_trait]
impl LandmarkDetector for ReplayDetector {
    async fn detect(
        &mut self,
        frame: &VideoFrame,
        _timestamp_ms: f64,
    ) -> KneecueResult<DetectorOutput> {
        self.records
            .get(frame.index as usize)
            .map(|record| record.output.clone())
            .ok_or_else(|| KneecueError::replay(format!("no detection recorded for frame {}", frame.index)))
    }

    /// Recordings come from the 33-point body model.
    fn landmark_count(&self) -> usize {
        POSE_LANDMARK_COUNT
    }

    fn name(&self) -> &str {
        "replay"
    }
}
