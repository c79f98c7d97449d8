//! # vidpipe
//!
//! Fetch a remote video asset, stream its decoded frames through a pluggable
//! transformation, and re-encode the result into a fresh output container,
//! with temporary artifacts cleaned up on success and failure alike.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vidpipe::{
//!     config::Config,
//!     pipeline::Pipeline,
//!     transform::TransformRegistry,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let registry = TransformRegistry::new();
//! let identity = registry.get("identity").unwrap();
//!
//! let pipeline = Pipeline::new(config, identity);
//! let report = pipeline
//!     .run("http://localhost:8000/video/asset.mp4")
//!     .await?;
//! println!("wrote {} frames to {:?}", report.frames_written, report.output_path);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`pipeline`] - The orchestrator state machine driving a single job
//! - [`fetch`] - Streaming HTTP retrieval of the remote asset
//! - [`video`] - Container probing, frame decoding and frame encoding
//! - [`transform`] - Pluggable per-frame transformations
//! - [`workspace`] - Per-job temporary directory lifecycle
//! - [`server`] - The standalone text-content save endpoint
//! - [`config`] - Configuration management
//!
//! ## Creating Custom Transforms
//!
//! Custom per-frame processing implements the [`Transform`](transform::Transform)
//! trait and must preserve the frame's width, height and pixel format:
//!
//! ```rust,no_run
//! use vidpipe::transform::Transform;
//! use vidpipe::video::FrameBuffer;
//! use vidpipe::error::Result;
//!
//! struct Invert;
//!
//! impl Transform for Invert {
//!     fn name(&self) -> &str {
//!         "invert"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Inverts every channel of every pixel"
//!     }
//!
//!     fn apply(&self, mut frame: FrameBuffer) -> Result<FrameBuffer> {
//!         for pixel in frame.as_image_mut().pixels_mut() {
//!             pixel.0 = [255 - pixel.0[0], 255 - pixel.0[1], 255 - pixel.0[2]];
//!         }
//!         Ok(frame)
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod server;
pub mod transform;
pub mod video;
pub mod workspace;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{FailureReport, PipelineError, Result},
    fetch::Fetcher,
    pipeline::{JobReport, Pipeline},
    transform::{Transform, TransformRegistry},
    video::{FrameBuffer, StreamMetadata},
    workspace::Workspace,
};
