use std::path::{Path, PathBuf};

use crate::coordinate::{Color, Dimension, Position, TimeRange};
use crate::error::ValidationError;

/// Fields every overlay kind may carry
///
/// Each field is independently optional; which ones are required depends on
/// the overlay kind and is checked by [`Overlay::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayCommon {
    pub position: Option<Position>,
    pub dimension: Option<Dimension>,
    pub time_range: Option<TimeRange>,
    pub fade_in_seconds: Option<f64>,
    pub fade_out_seconds: Option<f64>,
    /// Stacking order; carried for callers, the graph order is fixed by kind
    pub z_index: i32,
}

impl OverlayCommon {
    /// Fade-in length, with a zero length treated as no fade
    pub fn fade_in_duration(&self) -> Option<f64> {
        self.fade_in_seconds.filter(|seconds| *seconds > 0.0)
    }

    /// Fade-out length, with a zero length treated as no fade
    pub fn fade_out_duration(&self) -> Option<f64> {
        self.fade_out_seconds.filter(|seconds| *seconds > 0.0)
    }

    pub fn has_fade(&self) -> bool {
        self.fade_in_duration().is_some() || self.fade_out_duration().is_some()
    }
}

/// Picture or clip composited on top of the main video
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOverlay {
    file: Option<PathBuf>,
    still_image: bool,
}

impl ImageOverlay {
    pub fn new<P: Into<PathBuf>>(file: P) -> Self {
        Self {
            file: Some(file.into()),
            still_image: false,
        }
    }

    /// Mark the input as a single still picture
    ///
    /// Still pictures are rendered with `shortest=1` so they stop when the
    /// main video ends. Use [`crate::export::MediaProbe`] to find out.
    pub fn still_image(mut self, still: bool) -> Self {
        self.still_image = still;
        self
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn is_still_image(&self) -> bool {
        self.still_image
    }
}

/// Pre-built `drawtext=...` fragment, used verbatim
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOverlay {
    expression: String,
}

impl TextOverlay {
    pub fn new<S: Into<String>>(expression: S) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Rectangle drawn with `drawbox`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxOverlay {
    color: Option<Color>,
}

impl BoxOverlay {
    pub fn new(color: Color) -> Self {
        Self { color: Some(color) }
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }
}

/// Chroma-key the main video over a background image or clip
#[derive(Debug, Clone, PartialEq)]
pub struct ColorKeyOverlay {
    color: Option<Color>,
    image_file: Option<PathBuf>,
    video_file: Option<PathBuf>,
    similarity: f64,
    blend: f64,
}

impl Default for ColorKeyOverlay {
    fn default() -> Self {
        Self {
            color: None,
            image_file: None,
            video_file: None,
            similarity: Self::DEFAULT_SIMILARITY,
            blend: Self::DEFAULT_BLEND,
        }
    }
}

impl ColorKeyOverlay {
    /// ffmpeg's own defaults for `colorkey`
    pub const DEFAULT_SIMILARITY: f64 = 0.01;
    pub const DEFAULT_BLEND: f64 = 0.0;

    pub fn new(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn image_file<P: Into<PathBuf>>(mut self, file: P) -> Self {
        self.image_file = Some(file.into());
        self
    }

    pub fn video_file<P: Into<PathBuf>>(mut self, file: P) -> Self {
        self.video_file = Some(file.into());
        self
    }

    pub fn similarity(mut self, similarity: f64) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn blend(mut self, blend: f64) -> Self {
        self.blend = blend;
        self
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn similarity_value(&self) -> f64 {
        self.similarity
    }

    pub fn blend_value(&self) -> f64 {
        self.blend
    }

    /// Background inputs in the order they occupy the input list
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.image_file
            .as_deref()
            .into_iter()
            .chain(self.video_file.as_deref())
    }
}

/// The closed set of overlay kinds
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayKind {
    Image(ImageOverlay),
    Text(TextOverlay),
    Box(BoxOverlay),
    ColorKey(ColorKeyOverlay),
}

impl OverlayKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Text(_) => "text",
            Self::Box(_) => "box",
            Self::ColorKey(_) => "colorkey",
        }
    }
}

impl From<ImageOverlay> for OverlayKind {
    fn from(overlay: ImageOverlay) -> Self {
        Self::Image(overlay)
    }
}

impl From<TextOverlay> for OverlayKind {
    fn from(overlay: TextOverlay) -> Self {
        Self::Text(overlay)
    }
}

impl From<BoxOverlay> for OverlayKind {
    fn from(overlay: BoxOverlay) -> Self {
        Self::Box(overlay)
    }
}

impl From<ColorKeyOverlay> for OverlayKind {
    fn from(overlay: ColorKeyOverlay) -> Self {
        Self::ColorKey(overlay)
    }
}

/// A single overlay intent: kind-specific payload plus shared placement
///
/// ```rust
/// use overlay_compositor::coordinate::{Dimension, Position};
/// use overlay_compositor::overlay::Overlay;
///
/// # fn main() -> Result<(), overlay_compositor::error::ValidationError> {
/// let logo = Overlay::image("logo.png")
///     .dimension(Dimension::new(120, 40)?)
///     .position(Position::new(10, 10))
///     .fade_in(1.0);
/// assert_eq!(logo.kind().name(), "image");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    common: OverlayCommon,
    kind: OverlayKind,
}

impl Overlay {
    pub fn new<K: Into<OverlayKind>>(kind: K) -> Self {
        Self {
            common: OverlayCommon::default(),
            kind: kind.into(),
        }
    }

    pub fn image<P: Into<PathBuf>>(file: P) -> Self {
        Self::new(ImageOverlay::new(file))
    }

    pub fn text<S: Into<String>>(expression: S) -> Self {
        Self::new(TextOverlay::new(expression))
    }

    pub fn draw_box(color: Color) -> Self {
        Self::new(BoxOverlay::new(color))
    }

    pub fn position(mut self, position: Position) -> Self {
        self.common.position = Some(position);
        self
    }

    pub fn dimension(mut self, dimension: Dimension) -> Self {
        self.common.dimension = Some(dimension);
        self
    }

    pub fn time_range(mut self, time_range: TimeRange) -> Self {
        self.common.time_range = Some(time_range);
        self
    }

    pub fn fade_in(mut self, seconds: f64) -> Self {
        self.common.fade_in_seconds = Some(seconds);
        self
    }

    pub fn fade_out(mut self, seconds: f64) -> Self {
        self.common.fade_out_seconds = Some(seconds);
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.common.z_index = z_index;
        self
    }

    pub fn common(&self) -> &OverlayCommon {
        &self.common
    }

    pub fn kind(&self) -> &OverlayKind {
        &self.kind
    }

    pub fn into_parts(self) -> (OverlayCommon, OverlayKind) {
        (self.common, self.kind)
    }

    /// Check that every field this kind depends on is present and sane
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_fades()?;

        let kind = self.kind.name();
        match &self.kind {
            OverlayKind::Image(image) => {
                if image.file().is_none() {
                    return Err(ValidationError::missing(kind, "file"));
                }
                if self.common.dimension.is_none() {
                    return Err(ValidationError::missing(kind, "dimension"));
                }
            }
            OverlayKind::Text(text) => {
                if text.expression().trim().is_empty() {
                    return Err(ValidationError::missing(kind, "text expression"));
                }
            }
            OverlayKind::Box(draw_box) => {
                if draw_box.color().is_none() {
                    return Err(ValidationError::missing(kind, "color"));
                }
                if self.common.dimension.is_none() {
                    return Err(ValidationError::missing(kind, "dimension"));
                }
                if self.common.position.is_none() {
                    return Err(ValidationError::missing(kind, "position"));
                }
            }
            OverlayKind::ColorKey(color_key) => {
                if color_key.files().next().is_none() {
                    return Err(ValidationError::missing(kind, "image or video file"));
                }
                if self.common.dimension.is_none() {
                    return Err(ValidationError::missing(kind, "dimension"));
                }
                if color_key.color().is_none() {
                    return Err(ValidationError::missing(kind, "color"));
                }

                let similarity = color_key.similarity_value();
                if !(similarity > 0.0 && similarity <= 1.0) {
                    return Err(ValidationError::invalid(
                        "colorkey.similarity",
                        format!("expected a value in (0, 1], got {}", similarity),
                    ));
                }

                let blend = color_key.blend_value();
                if !(0.0..=1.0).contains(&blend) {
                    return Err(ValidationError::invalid(
                        "colorkey.blend",
                        format!("expected a value in [0, 1], got {}", blend),
                    ));
                }
            }
        }

        Ok(())
    }

    fn validate_fades(&self) -> Result<(), ValidationError> {
        let fades = [
            ("fade_in_seconds", self.common.fade_in_seconds),
            ("fade_out_seconds", self.common.fade_out_seconds),
        ];

        for (field, seconds) in fades {
            if let Some(seconds) = seconds {
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(ValidationError::invalid(
                        field,
                        format!("expected a finite value >= 0, got {}", seconds),
                    ));
                }
            }
        }

        Ok(())
    }
}
