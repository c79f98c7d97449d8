//! FFprobe stream metadata.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{OpenError, Result};
use crate::video::types::StreamMetadata;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a local video file for its stream metadata.
pub async fn probe(path: impl AsRef<Path>) -> Result<StreamMetadata> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OpenError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    which::which("ffprobe").map_err(|_| OpenError::ToolMissing {
        tool: "ffprobe".to_string(),
    })?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(OpenError::Unreadable {
            path: path.display().to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    let metadata = parse_probe_output(&output.stdout, path)?;
    debug!(
        "Probed {}: {}x{} @ {:.2}fps ({})",
        path.display(),
        metadata.width,
        metadata.height,
        metadata.fps,
        metadata.codec
    );
    Ok(metadata)
}

/// Parse ffprobe's JSON into stream metadata.
fn parse_probe_output(stdout: &[u8], path: &Path) -> Result<StreamMetadata> {
    let probe: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| OpenError::Unreadable {
            path: path.display().to_string(),
            reason: format!("bad ffprobe output: {}", e),
        })?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| OpenError::NoVideoStream {
            path: path.display().to_string(),
        })?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(OpenError::Unreadable {
                path: path.display().to_string(),
                reason: "stream reports no dimensions".to_string(),
            }
            .into())
        }
    };

    // Metadata comes from the probed stream only; a missing frame rate is
    // an unreadable source, not an excuse to invent one.
    let fps = stream
        .avg_frame_rate
        .as_ref()
        .and_then(|r| parse_frame_rate(r))
        .or_else(|| stream.r_frame_rate.as_ref().and_then(|r| parse_frame_rate(r)))
        .ok_or_else(|| OpenError::Unreadable {
            path: path.display().to_string(),
            reason: "stream reports no frame rate".to_string(),
        })?;

    Ok(StreamMetadata {
        fps,
        width,
        height,
        codec: stream.codec_name.clone().unwrap_or_default(),
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok().filter(|fps: &f64| *fps > 0.0)
}
