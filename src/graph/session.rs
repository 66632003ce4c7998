use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ValidationError;
use crate::overlay::{
    BoxOverlay, ColorKeyOverlay, ImageOverlay, Overlay, OverlayCommon, OverlayKind, TextOverlay,
};

/// An accepted overlay split into its shared fields and its payload
#[derive(Debug, Clone)]
pub(crate) struct Registered<T> {
    pub common: OverlayCommon,
    pub payload: T,
}

/// Single-owner builder collecting the overlays of one export
///
/// Overlays are validated as they are registered; a rejected overlay leaves
/// the session untouched. Sessions are not meant to be shared between
/// concurrent exports.
#[derive(Debug, Clone, Default)]
pub struct CompilationSession {
    color_key: Option<Registered<ColorKeyOverlay>>,
    images: Vec<Registered<ImageOverlay>>,
    texts: Vec<Registered<TextOverlay>>,
    boxes: Vec<Registered<BoxOverlay>>,
    inputs: Vec<PathBuf>,
}

impl CompilationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add an overlay
    ///
    /// Image files are appended to the input list. Color-key files are put in
    /// front of it, since the color-key stage always reads the first inputs.
    pub fn register(&mut self, overlay: Overlay) -> Result<&mut Self, ValidationError> {
        overlay.validate()?;

        if matches!(overlay.kind(), OverlayKind::ColorKey(_)) && self.color_key.is_some() {
            return Err(ValidationError::DuplicateColorKey);
        }

        let (common, kind) = overlay.into_parts();
        match kind {
            OverlayKind::ColorKey(payload) => {
                let files: Vec<PathBuf> = payload.files().map(Path::to_path_buf).collect();
                debug!("Registered colorkey overlay with {} background input(s)", files.len());
                self.inputs.splice(0..0, files);
                self.color_key = Some(Registered { common, payload });
            }
            OverlayKind::Image(payload) => {
                if let Some(file) = payload.file() {
                    debug!("Registered image overlay {:?}", file);
                    self.inputs.push(file.to_path_buf());
                }
                self.images.push(Registered { common, payload });
            }
            OverlayKind::Text(payload) => {
                debug!("Registered text overlay");
                self.texts.push(Registered { common, payload });
            }
            OverlayKind::Box(payload) => {
                debug!("Registered box overlay");
                self.boxes.push(Registered { common, payload });
            }
        }

        Ok(self)
    }

    /// Register several overlays, stopping at the first rejected one
    pub fn register_all<I>(&mut self, overlays: I) -> Result<&mut Self, ValidationError>
    where
        I: IntoIterator<Item = Overlay>,
    {
        for overlay in overlays {
            self.register(overlay)?;
        }
        Ok(self)
    }

    /// External input files in the order their `-i` flags must appear
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn has_color_key(&self) -> bool {
        self.color_key.is_some()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.color_key.is_none()
            && self.images.is_empty()
            && self.texts.is_empty()
            && self.boxes.is_empty()
    }

    pub(crate) fn color_key(&self) -> Option<&Registered<ColorKeyOverlay>> {
        self.color_key.as_ref()
    }

    pub(crate) fn images(&self) -> &[Registered<ImageOverlay>] {
        &self.images
    }

    pub(crate) fn texts(&self) -> &[Registered<TextOverlay>] {
        &self.texts
    }

    pub(crate) fn boxes(&self) -> &[Registered<BoxOverlay>] {
        &self.boxes
    }

    /// Number of leading inputs owned by the color-key stage
    pub(crate) fn color_key_input_count(&self) -> usize {
        self.color_key
            .as_ref()
            .map_or(0, |color_key| color_key.payload.files().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::{Color, Dimension, Position};

    fn dimension() -> Dimension {
        Dimension::new(320, 240).unwrap()
    }

    fn color_key(file: &str) -> Overlay {
        Overlay::new(ColorKeyOverlay::new(Color::new("green").unwrap()).image_file(file))
            .dimension(dimension())
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = CompilationSession::new();
        assert!(session.is_empty());
        assert!(session.inputs().is_empty());
    }

    #[test]
    fn test_images_append_inputs_in_registration_order() {
        let mut session = CompilationSession::new();
        session
            .register(Overlay::image("a.png").dimension(dimension()))
            .unwrap()
            .register(Overlay::image("b.png").dimension(dimension()))
            .unwrap();

        assert_eq!(session.inputs(), &[PathBuf::from("a.png"), PathBuf::from("b.png")]);
        assert_eq!(session.image_count(), 2);
    }

    #[test]
    fn test_color_key_inputs_come_first() {
        let mut session = CompilationSession::new();
        session
            .register(Overlay::image("a.png").dimension(dimension()))
            .unwrap();
        session.register(color_key("bg.png")).unwrap();
        session
            .register(Overlay::image("b.png").dimension(dimension()))
            .unwrap();

        assert_eq!(
            session.inputs(),
            &[
                PathBuf::from("bg.png"),
                PathBuf::from("a.png"),
                PathBuf::from("b.png")
            ]
        );
    }

    #[test]
    fn test_color_key_without_files_leaves_session_unchanged() {
        let mut session = CompilationSession::new();
        session
            .register(Overlay::image("a.png").dimension(dimension()))
            .unwrap();

        let keyless = Overlay::new(ColorKeyOverlay::new(Color::new("green").unwrap()))
            .dimension(dimension());
        let err = session.register(keyless).unwrap_err();

        assert!(matches!(err, ValidationError::MissingField { .. }));
        assert_eq!(session.inputs().len(), 1);
        assert!(!session.has_color_key());
    }

    #[test]
    fn test_second_color_key_is_rejected() {
        let mut session = CompilationSession::new();
        session.register(color_key("bg.png")).unwrap();

        let err = session.register(color_key("other.png")).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateColorKey);
        assert_eq!(session.inputs(), &[PathBuf::from("bg.png")]);
    }

    #[test]
    fn test_text_and_box_add_no_inputs() {
        let mut session = CompilationSession::new();
        session
            .register_all(vec![
                Overlay::text("drawtext=text='hello'"),
                Overlay::draw_box(Color::new("black").unwrap())
                    .dimension(dimension())
                    .position(Position::new(0, 0)),
            ])
            .unwrap();

        assert!(session.inputs().is_empty());
        assert_eq!(session.text_count(), 1);
        assert_eq!(session.box_count(), 1);
    }
}
