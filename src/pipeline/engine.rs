use std::path::PathBuf;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{FailureReport, PipelineError, Result},
    fetch::{Fetcher, VideoAsset},
    transform::Transform,
    video::{FrameSink, FrameSource, StreamMetadata},
    workspace::Workspace,
};

/// Summary of a completed pipeline job
#[derive(Debug)]
pub struct JobReport {
    pub job_id: Uuid,
    pub output_path: PathBuf,
    pub metadata: StreamMetadata,
    pub frames_read: u64,
    pub frames_written: u64,
}

/// Main orchestrator driving a single fetch-transform-encode job
///
/// The job is a strict sequence of stages:
/// 1. Fetch - download the remote asset into the workspace
/// 2. Open - probe metadata, start decoder, start encoder with that metadata
/// 3. Stream - read, transform and write one frame at a time
/// 4. Finalize - let the encoder write the container trailer
/// 5. Cleanup - remove the downloaded input, keep the output
///
/// A failure in any stage releases open handles, purges the workspace and
/// surfaces a structured failure report. Nothing is retried.
pub struct Pipeline {
    config: Config,
    transform: Box<dyn Transform>,
}

impl Pipeline {
    /// Create a pipeline with the given configuration and frame transform
    pub fn new(config: Config, transform: Box<dyn Transform>) -> Self {
        Self { config, transform }
    }

    /// Run one job against `url`, returning a report or a structured failure
    pub async fn run(&self, url: &str) -> std::result::Result<JobReport, FailureReport> {
        let mut workspace =
            Workspace::create(&self.config.workspace.root).map_err(|error| FailureReport {
                stage: "starting",
                error,
                remaining_files: Vec::new(),
            })?;

        info!("🎞  Starting pipeline job {}", workspace.job_id());
        info!("   Source: {}", url);
        info!("   Transform: {}", self.transform.name());

        // Stage 1: Fetch
        let asset = match self.fetch_input(&mut workspace, url).await {
            Ok(asset) => asset,
            Err(e) => return Err(Self::fail("fetching", e, &mut workspace)),
        };

        // Stage 2: Open decoder, then encoder with the decoder's metadata
        info!("📼 Opening streams...");
        let open_result =
            FrameSource::open(&asset.path, self.config.encoder.frame_timeout_secs).await;
        let (metadata, mut frames) = match open_result {
            Ok(opened) => opened,
            Err(e) => return Err(Self::fail("opening", e, &mut workspace)),
        };

        let output_path = workspace.path_for(&self.config.workspace.output_name);
        let mut sink =
            match FrameSink::open(&output_path, &metadata, &self.config.encoder).await {
                Ok(sink) => sink,
                Err(e) => return Err(Self::fail("opening", e, &mut workspace)),
            };

        // Stage 3: Stream frames through the transform
        info!("🎨 Streaming frames through {} transform...", self.transform.name());
        loop {
            let frame = match frames.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    sink.abort().await;
                    return Err(Self::fail("streaming", e, &mut workspace));
                }
            };

            let frame = match self.transform.apply(frame) {
                Ok(frame) => frame,
                Err(e) => {
                    sink.abort().await;
                    return Err(Self::fail("streaming", e, &mut workspace));
                }
            };

            if let Err(e) = sink.write(&frame).await {
                sink.abort().await;
                return Err(Self::fail("streaming", e, &mut workspace));
            }

            if sink.frames_written() % 100 == 0 {
                debug!("Processed {} frames", sink.frames_written());
            }
        }

        let frames_read = frames.frames_emitted();

        // Stage 4: Finalize the output container
        info!("🎬 Finalizing output after {} frames...", frames_read);
        let frames_written = match sink.close().await {
            Ok(n) => n,
            Err(e) => return Err(Self::fail("finalizing", e, &mut workspace)),
        };

        // Stage 5: Remove the downloaded input, keep the output
        if let Err(e) = workspace.remove(&asset.path) {
            return Err(Self::fail("cleanup", e, &mut workspace));
        }

        info!("🎉 Job {} complete: {}", workspace.job_id(), output_path.display());
        info!("   Frames: {} read, {} written", frames_read, frames_written);

        Ok(JobReport {
            job_id: workspace.job_id(),
            output_path,
            metadata,
            frames_read,
            frames_written,
        })
    }

    async fn fetch_input(&self, workspace: &mut Workspace, url: &str) -> Result<VideoAsset> {
        info!("🌐 Fetching remote asset...");
        let fetcher = Fetcher::new(&self.config.fetch)?;
        let input_path = workspace.path_for(&self.config.workspace.input_name);
        fetcher.fetch(url, &input_path).await
    }

    /// Best-effort cleanup for a failed stage, then the structured report
    fn fail(
        stage: &'static str,
        error: PipelineError,
        workspace: &mut Workspace,
    ) -> FailureReport {
        warn!("Job {} failed while {}: {}", workspace.job_id(), stage, error);
        workspace.purge();
        let remaining_files = workspace.remaining_files();
        if !remaining_files.is_empty() {
            warn!("{} temp files could not be removed", remaining_files.len());
        }
        FailureReport {
            stage,
            error,
            remaining_files,
        }
    }
}
