use crate::{error::Result, video::types::FrameBuffer};

/// Core trait for per-frame transformations
///
/// A transform is a pure mapping from one frame to another of exactly the
/// same width, height and pixel format. The sink is opened with the
/// source's dimensions and cannot renegotiate mid-stream, so any transform
/// that changes a frame's shape is rejected before a single frame reaches
/// the output.
pub trait Transform: Send + Sync {
    /// Returns the unique name of this transform
    fn name(&self) -> &str;

    /// Returns a human-readable description of this transform
    fn description(&self) -> &str;

    /// Map one decoded frame to its transformed successor
    ///
    /// Takes the frame by value: each frame is independently owned, so a
    /// transform may mutate it in place and hand it back without copying.
    fn apply(&self, frame: FrameBuffer) -> Result<FrameBuffer>;
}
