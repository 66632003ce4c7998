//! # Coordinates and Styling Values
//!
//! Small immutable value objects shared by every overlay: where it sits,
//! how large it is, when it is visible and what color it is drawn with.
//! Each one validates itself at construction so the compiler never has to.

pub mod types;

pub use types::{Color, Dimension, Position, Thickness, TimeRange, PRESERVE_ASPECT};
