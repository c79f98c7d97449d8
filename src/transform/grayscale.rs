use crate::error::Result;
use crate::transform::traits::Transform;
use crate::video::types::FrameBuffer;

/// Luma-weighted grayscale conversion.
///
/// Kept deliberately simple; it exists mostly to demonstrate that a real
/// transform satisfies the same shape contract as the identity.
pub struct GrayscaleTransform;

impl GrayscaleTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrayscaleTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for GrayscaleTransform {
    fn name(&self) -> &str {
        "grayscale"
    }

    fn description(&self) -> &str {
        "Converts frames to luma-weighted grayscale"
    }

    fn apply(&self, mut frame: FrameBuffer) -> Result<FrameBuffer> {
        for pixel in frame.as_image_mut().pixels_mut() {
            let [r, g, b] = pixel.0;
            let luma =
                (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8;
            pixel.0 = [luma, luma, luma];
        }
        Ok(frame)
    }
}
