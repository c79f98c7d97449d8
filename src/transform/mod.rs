//! # Frame Transform System
//!
//! The pluggable per-frame processing seam of the pipeline. A transform is
//! an injected strategy mapping each decoded frame to a new frame of the
//! same shape; the default is the identity.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vidpipe::transform::TransformRegistry;
//!
//! let registry = TransformRegistry::new();
//! let transform = registry.get("identity").unwrap();
//! ```

pub mod grayscale;
pub mod identity;
pub mod registry;
pub mod traits;

// Re-exports for convenience
pub use grayscale::GrayscaleTransform;
pub use identity::IdentityTransform;
pub use registry::TransformRegistry;
pub use traits::Transform;
