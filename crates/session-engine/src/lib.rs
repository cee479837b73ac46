//! KneeCue Session Engine
//!
//! Runs live pose sessions: acquires a detector, a camera, and a render
//! target through a capture backend, drives the per-frame loop, and
//! delivers processor output to the host.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                      PoseSession                      │
//! │ ┌─────────────┐  ┌──────────────────┐  ┌────────────┐ │
//! │ │ FrameSource │─▶│ LandmarkDetector │─▶│  Renderer  │ │
//! │ └─────────────┘  └────────┬─────────┘  └────────────┘ │
//! │                           ▼                           │
//! │                  ┌──────────────────┐                 │
//! │                  │  SignalPipeline  │                 │
//! │                  └────────┬─────────┘                 │
//! │                           ▼                           │
//! │                  ┌──────────────────┐                 │
//! │                  │    HostBridge    │                 │
//! │                  └──────────────────┘                 │
//! └───────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod bridge;
pub mod replay;
pub mod scripted;
pub mod session;
pub mod synthetic;

pub use backend::{CaptureBackend, FrameSource, LandmarkDetector, NullRenderer, SkeletonRenderer, VideoFrame};
pub use bridge::{ChannelBridge, HostBridge, HostInbox, JsonlBridge, MemoryBridge};
pub use replay::ReplayBackend;
pub use session::*;
pub use synthetic::{SquatMotion, SyntheticBackend};
