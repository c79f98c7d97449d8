use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use vidpipe::{
    config::Config,
    pipeline::Pipeline,
    server,
    transform::TransformRegistry,
};

#[derive(Parser)]
#[command(
    name = "vidpipe",
    version,
    about = "Fetch, transform and re-encode remote videos",
    long_about = "vidpipe downloads a remote video asset, streams its decoded frames through a pluggable transformation, and re-encodes the result into a fresh MP4 container, cleaning up its temporary files whether the job succeeds or fails."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one fetch-transform-encode job
    Process {
        /// Source video URL (overrides fetch.source_url from the config)
        #[arg(short, long)]
        url: Option<String>,

        /// Frame transform to apply (identity, grayscale)
        #[arg(short, long, default_value = "identity")]
        transform: String,
    },

    /// Serve the text-content save endpoint
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Directory the /views/ prefix is rooted at
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting vidpipe v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    match cli.command {
        Command::Process { url, transform } => {
            let url = url
                .or_else(|| {
                    (!config.fetch.source_url.is_empty()).then(|| config.fetch.source_url.clone())
                })
                .ok_or_else(|| {
                    anyhow::anyhow!("No source URL: pass --url or set fetch.source_url")
                })?;

            let registry = TransformRegistry::new();
            let transform = registry
                .get(&transform)
                .ok_or_else(|| anyhow::anyhow!("Unknown transform: {}", transform))?;

            info!("Using {} transform", transform.name());

            let pipeline = Pipeline::new(config, transform);
            match pipeline.run(&url).await {
                Ok(report) => {
                    info!("Job complete! Output saved to: {:?}", report.output_path);
                    info!(
                        "Frames: {} read, {} written",
                        report.frames_read, report.frames_written
                    );
                    Ok(())
                }
                Err(report) => Err(anyhow::anyhow!("{}", report)),
            }
        }
        Command::Serve { port, root } => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            info!("Serving save endpoint from {:?}", root);
            server::serve(addr, root).await?;
            Ok(())
        }
    }
}
