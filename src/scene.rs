//! # Scene Files
//!
//! A scene is a TOML list of overlays:
//!
//! ```toml
//! [[overlay]]
//! kind = "image"
//! file = "logo.png"
//! width = 120
//! height = 40
//! x = 10
//! y = 10
//! fade_out = 2.0
//!
//! [[overlay]]
//! kind = "text"
//! text = "drawtext=text='Hello':x=20:y=20"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::coordinate::{Color, Dimension, Position, Thickness, TimeRange, PRESERVE_ASPECT};
use crate::error::{ConfigError, Result, ValidationError};
use crate::export::MediaProbe;
use crate::graph::CompilationSession;
use crate::overlay::{BoxOverlay, ColorKeyOverlay, ImageOverlay, Overlay, OverlayKind, TextOverlay};

/// `thickness = "max"` or `thickness = 3`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThicknessSpec {
    Pixels(u32),
    Named(String),
}

/// One `[[overlay]]` table as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySpec {
    pub kind: String,
    pub file: Option<PathBuf>,
    pub image_file: Option<PathBuf>,
    pub video_file: Option<PathBuf>,
    pub text: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    pub z_index: Option<i32>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub thickness: Option<ThicknessSpec>,
    pub similarity: Option<f64>,
    pub blend: Option<f64>,
    pub still_image: Option<bool>,
}

impl OverlaySpec {
    /// Build the overlay descriptor; required fields are checked on registration
    pub fn to_overlay(&self) -> std::result::Result<Overlay, ValidationError> {
        let kind = self.kind_payload()?;
        let mut overlay = Overlay::new(kind);

        if self.x.is_some() || self.y.is_some() {
            overlay = overlay.position(Position::new(self.x.unwrap_or(0), self.y.unwrap_or(0)));
        }

        if self.width.is_some() || self.height.is_some() {
            overlay = overlay.dimension(Dimension::new(
                self.width.unwrap_or(PRESERVE_ASPECT),
                self.height.unwrap_or(PRESERVE_ASPECT),
            )?);
        }

        match (self.start, self.end) {
            (start, Some(end)) => {
                overlay = overlay.time_range(TimeRange::new(start.unwrap_or(0.0), end)?);
            }
            (Some(_), None) => {
                return Err(ValidationError::invalid(
                    "end",
                    "a start time needs an end time",
                ));
            }
            (None, None) => {}
        }

        if let Some(seconds) = self.fade_in {
            overlay = overlay.fade_in(seconds);
        }

        if let Some(seconds) = self.fade_out {
            overlay = overlay.fade_out(seconds);
        }

        if let Some(z_index) = self.z_index {
            overlay = overlay.z_index(z_index);
        }

        Ok(overlay)
    }

    fn kind_payload(&self) -> std::result::Result<OverlayKind, ValidationError> {
        let kind = match self.kind.as_str() {
            "image" => {
                let image = match &self.file {
                    Some(file) => ImageOverlay::new(file.clone()),
                    None => ImageOverlay::default(),
                };
                OverlayKind::Image(image.still_image(self.still_image.unwrap_or(false)))
            }
            "text" => OverlayKind::Text(TextOverlay::new(self.text.clone().unwrap_or_default())),
            "box" => OverlayKind::Box(match self.color()? {
                Some(color) => BoxOverlay::new(color),
                None => BoxOverlay::default(),
            }),
            "colorkey" | "color_key" => {
                let mut color_key = match self.color()? {
                    Some(color) => ColorKeyOverlay::new(color),
                    None => ColorKeyOverlay::default(),
                };
                if let Some(file) = &self.image_file {
                    color_key = color_key.image_file(file.clone());
                }
                if let Some(file) = &self.video_file {
                    color_key = color_key.video_file(file.clone());
                }
                if let Some(similarity) = self.similarity {
                    color_key = color_key.similarity(similarity);
                }
                if let Some(blend) = self.blend {
                    color_key = color_key.blend(blend);
                }
                OverlayKind::ColorKey(color_key)
            }
            other => {
                return Err(ValidationError::UnsupportedKind {
                    kind: other.to_string(),
                })
            }
        };

        Ok(kind)
    }

    fn color(&self) -> std::result::Result<Option<Color>, ValidationError> {
        let Some(name) = &self.color else {
            return Ok(None);
        };

        let thickness = match &self.thickness {
            None => Thickness::Max,
            Some(ThicknessSpec::Pixels(pixels)) => Thickness::pixels(*pixels)?,
            Some(ThicknessSpec::Named(named)) => named.parse()?,
        };

        Color::with_style(
            name.clone(),
            self.opacity.unwrap_or(Color::DEFAULT_OPACITY),
            thickness,
        )
        .map(Some)
    }
}

/// Ordered overlays read from a scene file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    #[serde(default, rename = "overlay")]
    pub overlays: Vec<OverlaySpec>,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        content.parse::<Self>().map_err(|e| {
            warn!("Could not parse scene {}: {}", path.display(), e);
            ConfigError::ParseFailed {
                path: path.display().to_string(),
            }
            .into()
        })
    }

    /// Register every overlay in file order
    ///
    /// Image overlays without an explicit `still_image` flag are probed when a
    /// probe is given.
    pub fn into_session(self, probe: Option<&dyn MediaProbe>) -> Result<CompilationSession> {
        let mut session = CompilationSession::new();

        for (index, mut spec) in self.overlays.into_iter().enumerate() {
            if spec.kind == "image" && spec.still_image.is_none() {
                spec.still_image = Self::detect_still_image(probe, spec.file.as_deref());
            }

            let overlay = spec.to_overlay()?;
            debug!("Scene overlay {}: {}", index, overlay.kind().name());
            session.register(overlay)?;
        }

        Ok(session)
    }

    fn detect_still_image(probe: Option<&dyn MediaProbe>, file: Option<&Path>) -> Option<bool> {
        let (probe, file) = (probe?, file?);
        match probe.probe(file) {
            Ok(report) => Some(report.is_still_image),
            Err(e) => {
                warn!("Could not probe overlay {}: {}", file.display(), e);
                None
            }
        }
    }
}

impl FromStr for Scene {
    type Err = toml::de::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(content)
    }
}
