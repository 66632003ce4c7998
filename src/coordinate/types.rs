use std::fmt;

use crate::error::ValidationError;

/// Sentinel accepted by ffmpeg's `scale` for "keep the aspect ratio"
pub const PRESERVE_ASPECT: i32 = -1;

/// Top-left corner of an overlay on the main video
///
/// Negative values are allowed: ffmpeg happily places overlays partially
/// off-screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// Target size of a scaled stream or a drawn box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    width: i32,
    height: i32,
}

impl Dimension {
    /// Create a dimension from a width and height
    ///
    /// Each side must be a positive number of pixels or [`PRESERVE_ASPECT`].
    pub fn new(width: i32, height: i32) -> Result<Self, ValidationError> {
        Self::check_side("dimension.width", width)?;
        Self::check_side("dimension.height", height)?;
        Ok(Self { width, height })
    }

    /// Scale to a fixed width, deriving the height from the aspect ratio
    pub fn with_width(width: i32) -> Result<Self, ValidationError> {
        Self::new(width, PRESERVE_ASPECT)
    }

    /// Scale to a fixed height, deriving the width from the aspect ratio
    pub fn with_height(height: i32) -> Result<Self, ValidationError> {
        Self::new(PRESERVE_ASPECT, height)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn check_side(field: &str, value: i32) -> Result<(), ValidationError> {
        if value > 0 || value == PRESERVE_ASPECT {
            Ok(())
        } else {
            Err(ValidationError::invalid(
                field,
                format!("expected a positive integer or {}, got {}", PRESERVE_ASPECT, value),
            ))
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Window of the timeline during which an overlay is enabled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Result<Self, ValidationError> {
        if !start.is_finite() || start < 0.0 {
            return Err(ValidationError::invalid(
                "time_range.start",
                format!("expected a finite value >= 0, got {}", start),
            ));
        }

        if !end.is_finite() || end <= start {
            return Err(ValidationError::invalid(
                "time_range.end",
                format!("expected a finite value greater than {}, got {}", start, end),
            ));
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The `enable=` option that restricts a filter to this window
    pub fn enable_clause(&self) -> String {
        format!("enable='between(t,{})'", self)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

/// Border thickness of a drawn box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thickness {
    /// Fill the whole box
    Max,
    Pixels(u32),
}

impl Thickness {
    pub fn pixels(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::invalid(
                "color.thickness",
                "thickness should be a positive integer or \"max\"",
            ));
        }
        Ok(Self::Pixels(value))
    }
}

impl Default for Thickness {
    fn default() -> Self {
        Self::Max
    }
}

impl std::str::FromStr for Thickness {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "max" {
            return Ok(Self::Max);
        }

        let value = s.parse::<u32>().map_err(|_| {
            ValidationError::invalid(
                "color.thickness",
                format!("thickness should be a positive integer or \"max\", {} given", s),
            )
        })?;
        Self::pixels(value)
    }
}

impl fmt::Display for Thickness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Pixels(value) => write!(f, "{}", value),
        }
    }
}

/// A named or hex color with opacity and stroke thickness
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    name: String,
    opacity: f64,
    thickness: Thickness,
}

impl Color {
    pub const DEFAULT_OPACITY: f64 = 0.4;

    /// Create a color with the default opacity and a filled box
    pub fn new<S: Into<String>>(name: S) -> Result<Self, ValidationError> {
        Self::with_style(name, Self::DEFAULT_OPACITY, Thickness::Max)
    }

    pub fn with_style<S: Into<String>>(
        name: S,
        opacity: f64,
        thickness: Thickness,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::invalid("color.name", "color name is empty"));
        }

        if !(0.0..=1.0).contains(&opacity) {
            return Err(ValidationError::invalid(
                "color.opacity",
                format!("opacity should be a value from 0 to 1, {} given", opacity),
            ));
        }

        if let Thickness::Pixels(0) = thickness {
            return Err(ValidationError::invalid(
                "color.thickness",
                "thickness should be a positive integer or \"max\"",
            ));
        }

        Ok(Self {
            name,
            opacity,
            thickness,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn thickness(&self) -> Thickness {
        self.thickness
    }

    /// `name@opacity`, the color syntax understood by ffmpeg filters
    pub fn with_alpha(&self) -> String {
        format!("{}@{}", self.name, self.opacity)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:t={}", self.with_alpha(), self.thickness)
    }
}
