//! # Pipeline Orchestration
//!
//! The state machine that sequences fetch, decode, transform, encode and
//! cleanup for a single job, guaranteeing cleanup on failure.

pub mod engine;

pub use engine::{JobReport, Pipeline};
