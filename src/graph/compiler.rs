use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::GraphError;
use crate::graph::session::CompilationSession;
use crate::overlay::render;

/// Rendered filter graph plus the input files its numeric references need
///
/// Input `0` is the main video, which is not part of [`CompiledGraph::inputs`];
/// the session's inputs follow it as `1`, `2`, ...
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledGraph {
    segments: Vec<String>,
    inputs: Vec<PathBuf>,
}

impl CompiledGraph {
    /// The full graph, segments joined by commas
    pub fn graph(&self) -> String {
        self.segments.join(",")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A stream consumed by a graph segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stream {
    /// Video stream of the n-th `-i` input
    Input(usize),
    /// Output of an earlier segment
    Label(String),
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(index) => write!(f, "[{}:v]", index),
            Self::Label(label) => write!(f, "[{}]", label),
        }
    }
}

fn out_label(stage: usize) -> String {
    format!("out{}", stage)
}

/// Turns a [`CompilationSession`] into a single filter graph
///
/// Stages are emitted in a fixed order: color key, images, text, boxes.
/// `stage` tracks the suffix of the latest `out<N>` label and starts at 1,
/// or 2 once a color-key stage has produced `out1`.
pub struct GraphCompiler<'a> {
    session: &'a CompilationSession,
    segments: Vec<String>,
    produced: HashSet<String>,
    stage: usize,
}

impl<'a> GraphCompiler<'a> {
    pub fn new(session: &'a CompilationSession) -> Self {
        Self {
            session,
            segments: Vec::new(),
            produced: HashSet::new(),
            stage: 1,
        }
    }

    /// Compile a session in one pass
    pub fn compile(session: &CompilationSession) -> Result<CompiledGraph, GraphError> {
        GraphCompiler::new(session).run()
    }

    fn run(mut self) -> Result<CompiledGraph, GraphError> {
        let session = self.session;
        let has_images = session.image_count() > 0;
        let has_texts = session.text_count() > 0;
        let has_boxes = session.box_count() > 0;

        self.emit_color_key(has_images || has_texts)?;
        self.emit_images(has_texts)?;

        if has_texts {
            self.emit_texts(has_boxes)?;
        }

        if has_boxes {
            self.emit_boxes()?;
        }

        info!(
            "Compiled filter graph: {} segment(s), {} input(s)",
            self.segments.len(),
            session.inputs().len()
        );

        Ok(CompiledGraph {
            segments: self.segments,
            inputs: session.inputs().to_vec(),
        })
    }

    /// `[0:v]colorkey=..[sck]`, `[1:v]scale=..[out1]`, `[out1][sck]overlay[out2]`
    fn emit_color_key(&mut self, followed: bool) -> Result<(), GraphError> {
        let session = self.session;
        let Some(color_key) = session.color_key() else {
            return Ok(());
        };

        let keyed = "sck".to_string();
        let background = out_label(1);
        let scale = match color_key.common.dimension {
            Some(dimension) => format!("scale={}", dimension),
            None => "scale=iw:ih".to_string(),
        };

        self.emit(
            &[Stream::Input(0)],
            &render::color_key(&color_key.payload),
            Some(keyed.clone()),
        )?;
        self.emit(&[Stream::Input(1)], &scale, Some(background.clone()))?;
        self.emit(
            &[Stream::Label(background), Stream::Label(keyed)],
            "overlay",
            followed.then(|| out_label(2)),
        )?;

        self.stage = 2;
        Ok(())
    }

    fn emit_images(&mut self, followed_by_text: bool) -> Result<(), GraphError> {
        let session = self.session;
        let images = session.images();
        // Image inputs sit after the main video and the color-key backgrounds
        let first_input = 1 + session.color_key_input_count();

        for (position, image) in images.iter().enumerate() {
            let scaled = format!("s{}", self.stage);
            self.emit(
                &[Stream::Input(first_input + position)],
                &render::image_source(&image.common),
                Some(scaled.clone()),
            )?;

            let followed = position + 1 < images.len() || followed_by_text;
            let output = followed.then(|| out_label(self.stage + 1));
            let base = self.current_stream();
            self.emit(
                &[base, Stream::Label(scaled)],
                &render::image_composite(&image.common, &image.payload),
                output,
            )?;

            self.stage += 1;
        }

        Ok(())
    }

    fn emit_texts(&mut self, followed_by_boxes: bool) -> Result<(), GraphError> {
        let body = self
            .session
            .texts()
            .iter()
            .map(|text| text.payload.expression())
            .collect::<Vec<_>>()
            .join(",");

        let output = followed_by_boxes.then(|| out_label(self.stage + 1));
        let base = self.current_stream();
        self.emit(&[base], &body, output)?;

        self.stage += 1;
        Ok(())
    }

    /// Boxes always close the graph, so their output stays unlabeled
    fn emit_boxes(&mut self) -> Result<(), GraphError> {
        let body = self
            .session
            .boxes()
            .iter()
            .map(|draw_box| render::draw_box(&draw_box.common, &draw_box.payload))
            .collect::<Vec<_>>()
            .join(",");

        let base = Stream::Label(out_label(self.stage));
        self.emit(&[base], &body, None)
    }

    /// The main video before any stage ran, else the latest stage output
    fn current_stream(&self) -> Stream {
        if self.stage == 1 {
            Stream::Input(0)
        } else {
            Stream::Label(out_label(self.stage))
        }
    }

    fn emit(
        &mut self,
        sources: &[Stream],
        body: &str,
        output: Option<String>,
    ) -> Result<(), GraphError> {
        let mut segment = String::new();

        for source in sources {
            if let Stream::Label(label) = source {
                if !self.produced.contains(label) {
                    return Err(GraphError::DanglingLabel {
                        label: label.clone(),
                        segment: self.segments.len(),
                    });
                }
            }
            segment.push_str(&source.to_string());
        }

        segment.push_str(body);

        if let Some(label) = output {
            segment.push_str(&format!("[{}]", label));
            self.produced.insert(label);
        }

        debug!("Segment {}: {}", self.segments.len(), segment);
        self.segments.push(segment);
        Ok(())
    }
}
