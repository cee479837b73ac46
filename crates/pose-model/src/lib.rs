//! KneeCue Pose Model
//!
//! Defines the data contracts shared by the signal core and the session:
//! - **Landmarks:** Raw detector output, the model's landmark indices, and
//!   the joint mapping validated at session start
//! - **Frames:** Typed per-frame joint sets derived from detector output
//! - **Events:** Processor output and the closed host message protocol
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the video
//! frame, never pixels.

pub mod event;
pub mod frame;
pub mod landmark;

pub use event::*;
pub use frame::*;
pub use landmark::*;
