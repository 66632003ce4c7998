//! # Export Coordination
//!
//! Turns a compiled session into ffmpeg argument lists, resolves
//! duration placeholders through a [`MediaProbe`], and runs the result.

pub mod coordinator;
pub mod placeholder;
pub mod probe;
pub mod runner;

pub use coordinator::ExportCoordinator;
pub use probe::{is_still_image, FfprobeProbe, MediaProbe, ProbeReport};
pub use runner::FfmpegRunner;
