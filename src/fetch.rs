//! Remote video retrieval.
//!
//! Downloads are streamed chunk by chunk straight into the workspace file,
//! so the full asset is never buffered in memory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::error::{FetchError, PipelineError, Result};

/// A remote video asset resolved to a local file inside the workspace
#[derive(Debug, Clone)]
pub struct VideoAsset {
    /// Where the asset was fetched from
    pub url: String,

    /// Local path the body was written to
    pub path: PathBuf,

    /// Size of the downloaded body in bytes
    pub size: u64,
}

/// Blocking-style HTTP fetcher for video assets
pub struct Fetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl Fetcher {
    /// Build a fetcher from configuration.
    ///
    /// The configured deadline covers the whole transfer, not just the
    /// connection handshake.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        let client = builder.build().map_err(|e| FetchError::Transport {
            url: config.source_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Fetch `url` and stream the body to `dest`.
    ///
    /// Any non-success status or transport failure aborts the job before an
    /// output file could exist; a partially written file is removed here so
    /// the caller never sees a truncated download.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<VideoAsset> {
        info!("Fetching {} -> {}", url, dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        let result = self.stream_body(response, &mut file, &mut written).await;
        if let Err(e) = result {
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
            return Err(match e {
                StreamFailure::Read(e) => self.classify(url, e),
                StreamFailure::Write(_) => FetchError::WriteFailed {
                    path: dest.display().to_string(),
                }
                .into(),
            });
        }

        file.flush().await?;
        info!("Fetched {} bytes from {}", written, url);

        Ok(VideoAsset {
            url: url.to_string(),
            path: dest.to_path_buf(),
            size: written,
        })
    }

    async fn stream_body(
        &self,
        mut response: reqwest::Response,
        file: &mut tokio::fs::File,
        written: &mut u64,
    ) -> std::result::Result<(), StreamFailure> {
        while let Some(chunk) = response.chunk().await.map_err(StreamFailure::Read)? {
            file.write_all(&chunk).await.map_err(StreamFailure::Write)?;
            *written += chunk.len() as u64;
        }
        debug!("Body stream complete ({} bytes)", written);
        Ok(())
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            PipelineError::timeout(format!("fetching {}", url), self.timeout_secs)
        } else {
            FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        }
    }
}

enum StreamFailure {
    Read(reqwest::Error),
    Write(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_writes_body_verbatim() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0u8..=255).cycle().take(4096).collect();

        Mock::given(method("GET"))
            .and(path("/video/asset.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("temp_video.mp4");
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();

        let asset = fetcher
            .fetch(&format!("{}/video/asset.mp4", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(asset.size, 4096);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_fetch_404_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("temp_video.mp4");
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();

        let err = fetcher
            .fetch(&format!("{}/video/missing.mp4", server.uri()), &dest)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "fetch");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        // Nothing listens on this port; connection is refused immediately.
        let dir = tempdir().unwrap();
        let dest = dir.path().join("temp_video.mp4");
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();

        let err = fetcher
            .fetch("http://127.0.0.1:9/video.mp4", &dest)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Fetch(FetchError::Transport { .. }) | PipelineError::Timeout { .. }
        ));
        assert!(!dest.exists());
    }
}
