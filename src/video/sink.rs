//! Frame encoding into an output container via an external FFmpeg process.
//!
//! The sink feeds raw RGB24 frames to `ffmpeg` over stdin in call order, so
//! output frame i is always input frame i. The container is only valid once
//! `close` has let the encoder write its trailer; `abort` deletes the
//! partial file instead, so a truncated output never survives a failed job.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EncoderConfig;
use crate::error::{EncodeError, OpenError, Result};
use crate::video::collect_stderr;
use crate::video::types::{FrameBuffer, StreamMetadata};

/// Writes frames into a fixed MPEG-4 family output container
pub struct FrameSink {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_task: Option<JoinHandle<String>>,
    path: PathBuf,
    metadata: StreamMetadata,
    frames_written: u64,
}

impl FrameSink {
    /// Open an encoder writing to `path` with the source's stream metadata.
    ///
    /// The metadata must come from the opened source, never from constants;
    /// that is what keeps input and output containers in agreement.
    pub async fn open(
        path: impl AsRef<Path>,
        metadata: &StreamMetadata,
        encoder: &EncoderConfig,
    ) -> Result<Self> {
        let path = path.as_ref();

        which::which("ffmpeg").map_err(|_| OpenError::ToolMissing {
            tool: "ffmpeg".to_string(),
        })?;

        let size = format!("{}x{}", metadata.width, metadata.height);
        let framerate = format!("{}", metadata.fps);

        let mut child = Command::new("ffmpeg")
            .args([
                "-v", "error",
                "-f", "rawvideo",
                "-pixel_format", "rgb24",
                "-video_size", size.as_str(),
                "-framerate", framerate.as_str(),
                "-i", "-",
                "-an",
                "-c:v", encoder.codec.as_str(),
                "-vtag", encoder.fourcc.as_str(),
                "-pix_fmt", "yuv420p",
                "-y",
            ])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EncodeError::SpawnFailed {
                reason: e.to_string(),
            })?;

        let stdin = child.stdin.take().expect("encoder stdin was piped");
        let stderr = child.stderr.take().expect("encoder stderr was piped");

        info!(
            "Opened encoder for {} ({} @ {:.2}fps, tag {})",
            path.display(),
            size,
            metadata.fps,
            encoder.fourcc
        );

        Ok(Self {
            child,
            stdin: Some(stdin),
            stderr_task: Some(collect_stderr(stderr)),
            path: path.to_path_buf(),
            metadata: metadata.clone(),
            frames_written: 0,
        })
    }

    /// Number of frames accepted so far
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// The output path this sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one encoded frame, preserving call order as output order.
    ///
    /// A shape mismatch is rejected before any bytes reach the encoder; the
    /// sink was opened with the source's dimensions and cannot renegotiate
    /// mid-stream.
    pub async fn write(&mut self, frame: &FrameBuffer) -> Result<()> {
        if !self.metadata.matches(frame) {
            return Err(EncodeError::ShapeMismatch {
                want_width: self.metadata.width,
                want_height: self.metadata.height,
                got_width: frame.width(),
                got_height: frame.height(),
            }
            .into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| EncodeError::WriteRejected {
            frame_index: self.frames_written,
            reason: "sink already closed".to_string(),
        })?;

        stdin
            .write_all(frame.as_raw())
            .await
            .map_err(|e| EncodeError::WriteRejected {
                frame_index: self.frames_written,
                reason: e.to_string(),
            })?;

        self.frames_written += 1;
        Ok(())
    }

    /// Finalize the container so the file is independently valid.
    ///
    /// Closing the encoder's stdin lets it flush buffered frames and write
    /// the trailer; a failing encoder leaves no file behind. Zero written
    /// frames is not a failure: the encoder sees immediate end of input and
    /// still finalizes an empty container.
    pub async fn close(mut self) -> Result<u64> {
        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.shutdown().await;
        }

        let status = self.child.wait().await?;
        let diagnostics = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        if !status.success() {
            let _ = std::fs::remove_file(&self.path);
            return Err(EncodeError::FinalizeFailed {
                reason: if diagnostics.trim().is_empty() {
                    format!("encoder exited with {}", status)
                } else {
                    diagnostics.trim().to_string()
                },
            }
            .into());
        }

        info!(
            "Finalized {} with {} frames",
            self.path.display(),
            self.frames_written
        );
        Ok(self.frames_written)
    }

    /// Kill the encoder and delete the partial output file.
    ///
    /// Used on any failure after the sink was opened; the output is either
    /// finalized by `close` or gone, never truncated.
    pub async fn abort(mut self) {
        self.stdin.take();
        if let Err(e) = self.child.kill().await {
            warn!("Could not kill encoder: {}", e);
        }
        // The drain task ends on its own once the dead child's pipe closes
        self.stderr_task.take();
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial output {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Could not remove partial output {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
