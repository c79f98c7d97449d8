//! Decoded frame stream over an external FFmpeg decode process.
//!
//! The source probes stream metadata first, then spawns `ffmpeg` emitting
//! raw RGB24 frames on stdout. Frames are read one at a time, so the stream
//! is lazy, finite and strictly single-pass.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{DecodeError, OpenError, PipelineError, Result};
use crate::video::collect_stderr;
use crate::video::probe::probe;
use crate::video::types::{FrameBuffer, StreamMetadata};

/// Opens local video files as decodable frame streams
pub struct FrameSource;

impl FrameSource {
    /// Open `path`, returning its stream metadata and a frame stream.
    ///
    /// `frame_timeout_secs` bounds how long a single frame read may block
    /// (0 disables the deadline).
    pub async fn open(
        path: impl AsRef<Path>,
        frame_timeout_secs: u64,
    ) -> Result<(StreamMetadata, FrameStream)> {
        let path = path.as_ref();

        let metadata = probe(path).await?;

        which::which("ffmpeg").map_err(|_| OpenError::ToolMissing {
            tool: "ffmpeg".to_string(),
        })?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args([
                "-map", "0:v:0",
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OpenError::Unreadable {
                path: path.display().to_string(),
                reason: format!("failed to start decoder: {}", e),
            })?;

        // Safe to take: both pipes were requested above
        let stdout = child.stdout.take().expect("decoder stdout was piped");
        let stderr = child.stderr.take().expect("decoder stderr was piped");

        info!(
            "Opened {} for decoding ({}x{} @ {:.2}fps)",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps
        );

        let stream = FrameStream {
            child,
            stdout: BufReader::new(stdout),
            stderr_task: Some(collect_stderr(stderr)),
            frame_len: metadata.frame_len(),
            width: metadata.width,
            height: metadata.height,
            frame_timeout_secs,
            frames_emitted: 0,
            finished: false,
        };

        Ok((metadata, stream))
    }
}

/// Lazy, finite, single-pass sequence of decoded frames.
///
/// Exhaustion is signalled by `Ok(None)`; a mid-stream decode failure ends
/// the sequence with an error, but frames already emitted remain valid.
pub struct FrameStream {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
    frame_len: usize,
    width: u32,
    height: u32,
    frame_timeout_secs: u64,
    frames_emitted: u64,
    finished: bool,
}

impl FrameStream {
    /// Number of frames produced so far
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Read the next decoded frame, or `None` on clean exhaustion.
    pub async fn next_frame(&mut self) -> Result<Option<FrameBuffer>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0usize;

        while filled < self.frame_len {
            let n = self.read_some(&mut buf[filled..]).await?;
            if n == 0 {
                self.finished = true;
                if filled == 0 {
                    // Clean end of stream, but only if the decoder agrees
                    return self.finish_stream().await;
                }
                let _ = self.child.start_kill();
                return Err(DecodeError::CorruptFrame {
                    frames_emitted: self.frames_emitted,
                    reason: format!(
                        "stream ended {} bytes into a {}-byte frame",
                        filled, self.frame_len
                    ),
                }
                .into());
            }
            filled += n;
        }

        let frame = FrameBuffer::from_rgb_bytes(self.width, self.height, buf)
            .ok_or_else(|| DecodeError::CorruptFrame {
                frames_emitted: self.frames_emitted,
                reason: "frame byte count does not match stream shape".to_string(),
            })?;

        self.frames_emitted += 1;
        Ok(Some(frame))
    }

    /// One read from the decoder pipe, bounded by the frame deadline
    async fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.frame_timeout_secs == 0 {
            return Ok(self.stdout.read(buf).await.map_err(map_read_err(self.frames_emitted))?);
        }

        let deadline = Duration::from_secs(self.frame_timeout_secs);
        match tokio::time::timeout(deadline, self.stdout.read(buf)).await {
            Ok(read) => Ok(read.map_err(map_read_err(self.frames_emitted))?),
            Err(_) => {
                self.finished = true;
                let _ = self.child.start_kill();
                Err(PipelineError::timeout(
                    "decoding a frame",
                    self.frame_timeout_secs,
                ))
            }
        }
    }

    /// Collect decoder stderr and exit status once stdout is exhausted
    async fn finish_stream(&mut self) -> Result<Option<FrameBuffer>> {
        let status = self.child.wait().await?;
        let diagnostics = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        if status.success() {
            debug!("Decoder finished after {} frames", self.frames_emitted);
            Ok(None)
        } else {
            Err(DecodeError::DecoderFailed {
                frames_emitted: self.frames_emitted,
                reason: if diagnostics.trim().is_empty() {
                    format!("decoder exited with {}", status)
                } else {
                    diagnostics.trim().to_string()
                },
            }
            .into())
        }
    }
}

fn map_read_err(frames_emitted: u64) -> impl FnOnce(std::io::Error) -> PipelineError {
    move |e| {
        DecodeError::DecoderFailed {
            frames_emitted,
            reason: format!("pipe read failed: {}", e),
        }
        .into()
    }
}
