//! # Overlay-Compositor
//!
//! Compile image, text, box and color-key overlays into a single ffmpeg
//! `-filter_complex` graph, together with the ordered `-i` inputs it refers to.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use overlay_compositor::{
//!     config::Config,
//!     coordinate::{Dimension, Position},
//!     export::{ExportCoordinator, FfmpegRunner, FfprobeProbe},
//!     graph::CompilationSession,
//!     overlay::Overlay,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//!
//! let mut session = CompilationSession::new();
//! session.register(
//!     Overlay::image("logo.png")
//!         .dimension(Dimension::new(120, 40)?)
//!         .position(Position::new(10, 10))
//!         .fade_out(2.0),
//! )?;
//!
//! let probe = FfprobeProbe::from_config(&config.ffmpeg);
//! let coordinator = ExportCoordinator::new("input.mp4", &config.export).with_probe(&probe);
//! let args = coordinator.build_command(&session, Path::new("output.mp4"))?;
//!
//! FfmpegRunner::from_config(&config.ffmpeg).run(&args).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`coordinate`] - Positions, dimensions, time ranges and colors
//! - [`overlay`] - Overlay descriptors and their filter expressions
//! - [`graph`] - Registration session and the filter graph compiler
//! - [`export`] - Command assembly, probing and ffmpeg execution
//! - [`scene`] - TOML scene files
//! - [`config`] - Configuration management

pub mod config;
pub mod coordinate;
pub mod error;
pub mod export;
pub mod graph;
pub mod overlay;
pub mod scene;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{CompositorError, Result},
    export::ExportCoordinator,
    graph::{CompilationSession, CompiledGraph, GraphCompiler},
    overlay::Overlay,
    scene::Scene,
};
