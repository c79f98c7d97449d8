use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for vidpipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote fetch settings
    pub fetch: FetchConfig,

    /// Workspace (temporary directory) settings
    pub workspace: WorkspaceConfig,

    /// Output encoding settings
    pub encoder: EncoderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            workspace: WorkspaceConfig::default(),
            encoder: EncoderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string(),
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.fetch.validate()?;
        self.workspace.validate()?;
        self.encoder.validate()?;
        Ok(())
    }
}

/// Remote fetch configuration
///
/// The source URL lives here rather than in code so deployments can point
/// the pipeline anywhere without rebuilding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// URL of the remote video asset
    pub source_url: String,

    /// Overall deadline for the download, in seconds (0 = no deadline)
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            timeout_secs: 120,
        }
    }
}

impl FetchConfig {
    fn validate(&self) -> Result<()> {
        if !self.source_url.is_empty()
            && !self.source_url.starts_with("http://")
            && !self.source_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                key: "fetch.source_url".to_string(),
                value: self.source_url.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory under which each job gets its own subdirectory
    pub root: PathBuf,

    /// Filename for the downloaded input inside the job directory
    pub input_name: String,

    /// Filename for the encoded output inside the job directory
    pub output_name: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("temp"),
            input_name: "temp_video.mp4".to_string(),
            output_name: "output.mp4".to_string(),
        }
    }
}

impl WorkspaceConfig {
    fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("workspace.input_name", &self.input_name),
            ("workspace.output_name", &self.output_name),
        ] {
            if name.is_empty() || name.contains(std::path::MAIN_SEPARATOR) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: name.clone(),
                }
                .into());
            }
        }
        if self.input_name == self.output_name {
            return Err(ConfigError::InvalidValue {
                key: "workspace.output_name".to_string(),
                value: format!("{} (collides with input_name)", self.output_name),
            }
            .into());
        }
        Ok(())
    }
}

/// Output encoder configuration
///
/// The output format is fixed to an MPEG-4 family container; only the
/// fourcc tag and frame deadline are tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Video codec passed to the encoder
    pub codec: String,

    /// Four-character codec tag written into the container
    pub fourcc: String,

    /// Deadline for reading a single decoded frame, in seconds (0 = none)
    pub frame_timeout_secs: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            codec: "mpeg4".to_string(),
            fourcc: "mp4v".to_string(),
            frame_timeout_secs: 30,
        }
    }
}

impl EncoderConfig {
    fn validate(&self) -> Result<()> {
        if self.fourcc.len() != 4 {
            return Err(ConfigError::InvalidValue {
                key: "encoder.fourcc".to_string(),
                value: self.fourcc.clone(),
            }
            .into());
        }
        if self.codec.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "encoder.codec".to_string(),
                value: self.codec.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original = Config::default();
        original.fetch.source_url = "http://localhost:8000/video/hogak.mp4".to_string();

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(original.fetch.source_url, loaded.fetch.source_url);
        assert_eq!(original.encoder.fourcc, loaded.encoder.fourcc);
        assert_eq!(original.workspace.input_name, loaded.workspace.input_name);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let result = Config::from_file(dir.path().join("nope.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_fourcc() {
        let mut config = Config::default();
        config.encoder.fourcc = "mp4".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_colliding_artifact_names() {
        let mut config = Config::default();
        config.workspace.input_name = "output.mp4".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_source_url() {
        let mut config = Config::default();
        config.fetch.source_url = "ftp://example.com/v.mp4".to_string();
        assert!(config.validate().is_err());
    }
}
