use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use overlay_compositor::{
    config::Config,
    export::{ExportCoordinator, FfmpegRunner, FfprobeProbe, MediaProbe},
    graph::GraphCompiler,
    scene::Scene,
    CompositorError,
};

#[derive(Parser)]
#[command(
    name = "overlay-compositor",
    version,
    about = "Burn image, text, box and color-key overlays into a video with ffmpeg",
    long_about = "Overlay-Compositor reads a TOML scene of overlays, compiles them into a single ffmpeg filter graph and runs ffmpeg with the matching inputs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the overlays of a scene file to a video
    Render {
        /// Main video file
        #[arg(short, long)]
        input: PathBuf,

        /// Scene file listing the overlays
        #[arg(short, long)]
        scene: PathBuf,

        /// Output video file path
        #[arg(short, long)]
        output: PathBuf,

        /// Print the ffmpeg arguments instead of running ffmpeg
        #[arg(long)]
        dry_run: bool,
    },

    /// Concatenate h264 files without re-encoding
    Merge {
        /// First file of the merged video
        #[arg(short, long)]
        input: PathBuf,

        /// Files appended after the input, in order
        #[arg(short, long = "segment", required = true)]
        segments: Vec<PathBuf>,

        /// Output video file path
        #[arg(short, long)]
        output: PathBuf,

        /// Print the ffmpeg arguments instead of running ffmpeg
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the filter graph and inputs a scene compiles to
    Preview {
        /// Scene file listing the overlays
        #[arg(short, long)]
        scene: PathBuf,
    },

    /// Remux an h264 video into an MPEG transport stream
    TransportStream {
        /// Video to remux
        #[arg(short, long)]
        input: PathBuf,

        /// Output .ts file path
        #[arg(short, long)]
        output: PathBuf,

        /// Print the ffmpeg arguments instead of running ffmpeg
        #[arg(long)]
        dry_run: bool,
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

    info!("Starting Overlay-Compositor v{}", env!("CARGO_PKG_VERSION"));

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

    let probe = FfprobeProbe::from_config(&config.ffmpeg);
    let runner = FfmpegRunner::from_config(&config.ffmpeg);

    let (mut args, dry_run) = match cli.command {
        Commands::Render {
            input,
            scene,
            output,
            dry_run,
        } => {
            info!("Input: {:?}", input);
            info!("Scene: {:?}", scene);
            info!("Output: {:?}", output);

            let session =
                Scene::from_file(&scene)?.into_session(Some(&probe as &dyn MediaProbe))?;
            info!(
                "Registered {} image, {} text and {} box overlay(s){}",
                session.image_count(),
                session.text_count(),
                session.box_count(),
                if session.has_color_key() { " plus a color key" } else { "" }
            );

            let coordinator = ExportCoordinator::new(input, &config.export).with_probe(&probe);
            (coordinator.build_command(&session, &output)?, dry_run)
        }
        Commands::Merge {
            input,
            segments,
            output,
            dry_run,
        } => {
            info!("Merging {:?} with {} segment(s)", input, segments.len());
            let coordinator = ExportCoordinator::new(input, &config.export).with_probe(&probe);
            (coordinator.merge_command(&segments, &output)?, dry_run)
        }
        Commands::Preview { scene } => {
            info!("Previewing scene {:?}", scene);
            let session = Scene::from_file(&scene)?.into_session(None)?;
            let compiled = GraphCompiler::compile(&session)?;

            for (index, input) in compiled.inputs().iter().enumerate() {
                println!("[{}:v] {}", index + 1, input.display());
            }
            for segment in compiled.segments() {
                println!("{}", segment);
            }
            return Ok(());
        }
        Commands::TransportStream {
            input,
            output,
            dry_run,
        } => {
            info!("Remuxing {:?} to MPEG-TS", input);
            let coordinator = ExportCoordinator::new(input, &config.export).with_probe(&probe);
            (coordinator.transport_stream_command(&output)?, dry_run)
        }
    };

    if config.export.overwrite && args.first().map(String::as_str) != Some("-y") {
        args.insert(0, "-y".to_string());
    }

    if dry_run {
        println!("{} {}", config.ffmpeg.binary, args.join(" "));
        return Ok(());
    }

    if let Err(e) = runner.run(&args).await {
        let err = CompositorError::from(e);
        anyhow::bail!(err.user_message());
    }

    info!("Export complete!");
    Ok(())
}
