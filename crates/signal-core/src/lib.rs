//! KneeCue Signal Core
//!
//! Turns a noisy, intermittently missing stream of landmark frames into a
//! stable stream of semantic events:
//! - **Geometry:** Interior angle at a vertex from three 2D points
//! - **Adapter:** Raw detector output to a typed hip/knee/ankle frame
//! - **Processor:** Angle readings plus threshold/cooldown cue firing
//! - **Skeleton:** Overlay geometry for the render side branch
//!
//! This crate is pure computation. It does no I/O and has no async or
//! platform dependencies.

pub mod adapter;
pub mod geometry;
pub mod pipeline;
pub mod processor;
pub mod skeleton;

pub use adapter::FrameAdapter;
pub use geometry::angle_deg;
pub use pipeline::{PipelineStats, SignalPipeline};
pub use processor::{PoseSignalProcessor, ProcessorState};
pub use skeleton::{OverlayStyle, SkeletonOverlay};
