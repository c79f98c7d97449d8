use crate::error::Result;
use crate::transform::traits::Transform;
use crate::video::types::FrameBuffer;

/// The default transform: hands every frame back untouched.
///
/// This is the extension placeholder the pipeline ships with; real
/// processing plugs in by implementing [`Transform`] and registering it.
pub struct IdentityTransform;

impl IdentityTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdentityTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for IdentityTransform {
    fn name(&self) -> &str {
        "identity"
    }

    fn description(&self) -> &str {
        "Passes frames through unchanged"
    }

    fn apply(&self, frame: FrameBuffer) -> Result<FrameBuffer> {
        Ok(frame)
    }
}
