//! # Video I/O Module
//!
//! Container probing, frame decoding and frame encoding, all backed by
//! external `ffmpeg`/`ffprobe` processes speaking raw RGB24 over pipes.

pub mod probe;
pub mod sink;
pub mod source;
pub mod types;

use tokio::io::AsyncReadExt;
use tokio::process::ChildStderr;
use tokio::task::JoinHandle;

/// Drain a child's stderr concurrently so the pipe never fills.
///
/// A decoder or encoder that blocks writing diagnostics stops moving frame
/// data, so stderr must be consumed while the stream is active, not after.
/// The collected text is joined when the child is reaped.
pub(crate) fn collect_stderr(mut stderr: ChildStderr) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut diagnostics = String::new();
        let _ = stderr.read_to_string(&mut diagnostics).await;
        diagnostics
    })
}

pub use probe::probe;
pub use sink::FrameSink;
pub use source::{FrameSource, FrameStream};
pub use types::{FrameBuffer, StreamMetadata};
