//! # Overlay Descriptors
//!
//! Typed overlay intents (image, text, box, color key) and the pure
//! functions that turn each of them into an ffmpeg filter expression.

pub mod render;
pub mod types;

pub use render::{duration_placeholder, format_seconds, VIDEO_LENGTH_TOKEN};
pub use types::{
    BoxOverlay, ColorKeyOverlay, ImageOverlay, Overlay, OverlayCommon, OverlayKind, TextOverlay,
};
