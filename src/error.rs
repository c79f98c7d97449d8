use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the vidpipe library
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Open error: {0}")]
    Open(#[from] OpenError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {seconds}s while {operation}")]
    Timeout { operation: String, seconds: u64 },
}

/// Network retrieval errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Transport failure for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Failed to write downloaded body to {path}")]
    WriteFailed { path: String },
}

/// Errors opening an input container for decoding
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Input file not found: {path}")]
    NotFound { path: String },

    #[error("Not a decodable container: {path} - {reason}")]
    Unreadable { path: String, reason: String },

    #[error("No video stream in {path}")]
    NoVideoStream { path: String },

    #[error("Required tool not available: {tool}")]
    ToolMissing { tool: String },
}

/// Mid-stream frame decode errors
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Corrupt frame after {frames_emitted} frames: {reason}")]
    CorruptFrame { frames_emitted: u64, reason: String },

    #[error("Decoder exited abnormally after {frames_emitted} frames: {reason}")]
    DecoderFailed { frames_emitted: u64, reason: String },
}

/// Frame encoding errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Frame shape {got_width}x{got_height} does not match stream {want_width}x{want_height}")]
    ShapeMismatch {
        want_width: u32,
        want_height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("Encoder rejected frame {frame_index}: {reason}")]
    WriteRejected { frame_index: u64, reason: String },

    #[error("Encoder failed to finalize output: {reason}")]
    FinalizeFailed { reason: String },

    #[error("Failed to start encoder: {reason}")]
    SpawnFailed { reason: String },
}

/// Workspace directory errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to create workspace directory {path}: {reason}")]
    CreateFailed { path: String, reason: String },

    #[error("Failed to remove {path}: {reason}")]
    RemoveFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Structured description of a failed job, reported by the orchestrator.
///
/// Carries the failed pipeline stage, the originating error and whatever
/// temporary files were left behind after best-effort cleanup.
#[derive(Debug)]
pub struct FailureReport {
    pub stage: &'static str,
    pub error: PipelineError,
    pub remaining_files: Vec<PathBuf>,
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job failed while {}: {}", self.stage, self.error)?;
        if !self.remaining_files.is_empty() {
            write!(f, " (files left behind: ")?;
            for (i, path) in self.remaining_files.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", path.display())?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureReport {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl PipelineError {
    /// Create a timeout error for the named operation
    pub fn timeout<S: Into<String>>(operation: S, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    /// Short machine-readable kind tag, used in failure reports and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Open(_) => "open",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::Workspace(_) => "workspace",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Timeout { .. } => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = PipelineError::from(FetchError::Status {
            url: "http://localhost/v.mp4".to_string(),
            status: 404,
        });
        assert_eq!(err.kind(), "fetch");

        let err = PipelineError::timeout("fetching video", 30);
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_failure_report_lists_remaining_files() {
        let report = FailureReport {
            stage: "streaming",
            error: DecodeError::CorruptFrame {
                frames_emitted: 12,
                reason: "truncated packet".to_string(),
            }
            .into(),
            remaining_files: vec![PathBuf::from("/tmp/job/temp_video.mp4")],
        };

        let text = report.to_string();
        assert!(text.contains("streaming"));
        assert!(text.contains("temp_video.mp4"));
    }
}
