//! # Filter Graph Compiler
//!
//! Collects overlays in a [`CompilationSession`] and compiles them into one
//! `-filter_complex` graph with matching input files.
//!
//! ```rust
//! use overlay_compositor::coordinate::{Dimension, Position};
//! use overlay_compositor::graph::{CompilationSession, GraphCompiler};
//! use overlay_compositor::overlay::Overlay;
//!
//! # fn main() -> overlay_compositor::Result<()> {
//! let mut session = CompilationSession::new();
//! session.register(
//!     Overlay::image("logo.png")
//!         .dimension(Dimension::new(120, 40)?)
//!         .position(Position::new(10, 10)),
//! )?;
//!
//! let compiled = GraphCompiler::compile(&session)?;
//! assert_eq!(compiled.graph(), "[1:v]scale=120:40[s1],[0:v][s1]overlay=10:10");
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod session;

pub use compiler::{CompiledGraph, GraphCompiler};
pub use session::CompilationSession;
