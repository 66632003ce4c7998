use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{ConfigError, Result, ValidationError};
use crate::export::placeholder::{find_placeholder, resolve_duration_placeholders};
use crate::export::probe::{MediaProbe, ProbeReport};
use crate::graph::{CompilationSession, GraphCompiler};

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// Assembles ffmpeg argument lists around one main video
///
/// The coordinator never runs anything itself; hand the arguments to
/// [`crate::export::FfmpegRunner`] or any other process layer.
pub struct ExportCoordinator<'a> {
    primary: PathBuf,
    config: ExportConfig,
    probe: Option<&'a dyn MediaProbe>,
}

impl<'a> ExportCoordinator<'a> {
    pub fn new<P: Into<PathBuf>>(primary: P, config: &ExportConfig) -> Self {
        Self {
            primary: primary.into(),
            config: config.clone(),
            probe: None,
        }
    }

    /// Use a probe for codec checks and duration placeholders
    pub fn with_probe(mut self, probe: &'a dyn MediaProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// `-i <main> -i <input>... -filter_complex <graph> <output>`
    ///
    /// The filter flag is left out when the session compiles to an empty
    /// graph. Duration placeholders are resolved by probing the main video.
    pub fn build_command(
        &self,
        session: &CompilationSession,
        output: &Path,
    ) -> Result<Vec<String>> {
        let compiled = GraphCompiler::compile(session)?;
        let graph = self.finalize_graph(compiled.graph())?;

        let mut commands = vec!["-i".to_string(), path_arg(&self.primary)];

        for input in compiled.inputs() {
            commands.push("-i".to_string());
            commands.push(path_arg(input));
        }

        if !graph.is_empty() {
            commands.push("-filter_complex".to_string());
            commands.push(graph);
        }

        commands.push(path_arg(output));

        self.log_command("render", &commands);
        Ok(commands)
    }

    /// Concat-protocol merge of the main video followed by `segments`
    ///
    /// Stream copy only works for files sharing the required codec, which is
    /// checked on every file before anything else happens.
    pub fn merge_command(&self, segments: &[PathBuf], output: &Path) -> Result<Vec<String>> {
        self.ensure_codec("Concat protocol merge", &self.primary)?;
        for segment in segments {
            self.ensure_codec("Concat protocol merge", segment)?;
        }

        let files: Vec<String> = std::iter::once(self.primary.as_path())
            .chain(segments.iter().map(PathBuf::as_path))
            .map(path_arg)
            .collect();

        let commands = vec![
            "-y".to_string(),
            "-i".to_string(),
            format!("concat:{}", files.join("|")),
            "-c".to_string(),
            "copy".to_string(),
            "-bsf:a".to_string(),
            "aac_adtstoasc".to_string(),
            path_arg(output),
        ];

        self.log_command("merge", &commands);
        Ok(commands)
    }

    /// Stream-copy remux of the main video into an MPEG transport stream
    pub fn transport_stream_command(&self, output: &Path) -> Result<Vec<String>> {
        self.ensure_codec("Transport stream export", &self.primary)?;

        let commands = vec![
            "-y".to_string(),
            "-i".to_string(),
            path_arg(&self.primary),
            "-c".to_string(),
            "copy".to_string(),
            "-bsf:v".to_string(),
            "h264_mp4toannexb".to_string(),
            "-f".to_string(),
            "mpegts".to_string(),
            path_arg(output),
        ];

        self.log_command("transport-stream", &commands);
        Ok(commands)
    }

    fn finalize_graph(&self, graph: String) -> Result<String> {
        let Some(token) = find_placeholder(&graph) else {
            return Ok(graph);
        };

        let Some(probe) = self.probe else {
            return Err(ConfigError::UnresolvedPlaceholder {
                token: token.to_string(),
            }
            .into());
        };

        let report = probe.probe(&self.primary)?;
        debug!(
            "Resolving duration placeholders with {:.3}s from {}",
            report.duration_seconds,
            self.primary.display()
        );

        let resolved = resolve_duration_placeholders(&graph, report.duration_seconds);
        if let Some(token) = find_placeholder(&resolved) {
            return Err(ConfigError::UnresolvedPlaceholder {
                token: token.to_string(),
            }
            .into());
        }

        Ok(resolved)
    }

    fn probe_file(&self, path: &Path) -> Result<ProbeReport> {
        let probe = self.probe.ok_or_else(|| ConfigError::MissingKey {
            key: "media probe".to_string(),
        })?;
        Ok(probe.probe(path)?)
    }

    fn ensure_codec(&self, operation: &str, path: &Path) -> Result<()> {
        let report = self.probe_file(path)?;

        if report.video_codec != self.config.required_codec {
            return Err(ValidationError::UnsupportedCodec {
                operation: format!("{} of {}", operation, path.display()),
                expected: self.config.required_codec.clone(),
                found: report.video_codec,
            }
            .into());
        }

        Ok(())
    }

    fn log_command(&self, kind: &str, commands: &[String]) {
        if self.config.log_commands {
            info!("ffmpeg {} command: {}", kind, commands.join(" "));
        } else {
            debug!("ffmpeg {} command: {} argument(s)", kind, commands.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::coordinate::{Color, Dimension, Position, TimeRange};
    use crate::error::{CompositorError, ProbeError};
    use crate::overlay::{ColorKeyOverlay, ImageOverlay, Overlay};

    struct FakeProbe {
        codec: &'static str,
        duration: f64,
        calls: Cell<usize>,
    }

    impl FakeProbe {
        fn new(codec: &'static str, duration: f64) -> Self {
            Self {
                codec,
                duration,
                calls: Cell::new(0),
            }
        }
    }

    impl MediaProbe for FakeProbe {
        fn probe(&self, _path: &Path) -> std::result::Result<ProbeReport, ProbeError> {
            self.calls.set(self.calls.get() + 1);
            Ok(ProbeReport {
                video_codec: self.codec.to_string(),
                duration_seconds: self.duration,
                is_still_image: false,
            })
        }
    }

    /// Reports `hevc` for any path not listed
    struct CodecByPath(&'static [(&'static str, &'static str)]);

    impl MediaProbe for CodecByPath {
        fn probe(&self, path: &Path) -> std::result::Result<ProbeReport, ProbeError> {
            let codec = self
                .0
                .iter()
                .find(|(file, _)| Path::new(file) == path)
                .map_or("hevc", |(_, codec)| *codec);
            Ok(ProbeReport {
                video_codec: codec.to_string(),
                duration_seconds: 10.0,
                is_still_image: false,
            })
        }
    }

    struct BrokenProbe;

    impl MediaProbe for BrokenProbe {
        fn probe(&self, path: &Path) -> std::result::Result<ProbeReport, ProbeError> {
            Err(ProbeError::Failed {
                path: path.display().to_string(),
                stderr: "moov atom not found".to_string(),
            })
        }
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    fn logo() -> Overlay {
        Overlay::image("logo.png")
            .dimension(Dimension::new(64, 64).unwrap())
            .position(Position::new(10, 10))
    }

    #[test]
    fn test_build_command_shape() {
        let mut session = CompilationSession::new();
        session.register(logo()).unwrap();

        let coordinator = ExportCoordinator::new("main.mp4", &ExportConfig::default());
        let command = coordinator
            .build_command(&session, Path::new("out.mp4"))
            .unwrap();

        assert_eq!(
            command,
            strings(&[
                "-i",
                "main.mp4",
                "-i",
                "logo.png",
                "-filter_complex",
                "[1:v]scale=64:64[s1],[0:v][s1]overlay=10:10",
                "out.mp4",
            ])
        );
    }

    #[test]
    fn test_build_command_with_color_key_orders_inputs() {
        let mut session = CompilationSession::new();
        session.register(logo()).unwrap();
        session
            .register(
                Overlay::new(
                    ColorKeyOverlay::new(Color::new("green").unwrap()).video_file("bg.mp4"),
                )
                .dimension(Dimension::new(1920, 1080).unwrap()),
            )
            .unwrap();

        let coordinator = ExportCoordinator::new("main.mp4", &ExportConfig::default());
        let command = coordinator
            .build_command(&session, Path::new("out.mp4"))
            .unwrap();

        assert_eq!(
            &command[..6],
            &strings(&["-i", "main.mp4", "-i", "bg.mp4", "-i", "logo.png"])[..]
        );
        assert!(command[7].starts_with("[0:v]colorkey=green@0.4:0.01:0[sck]"));
    }

    #[test]
    fn test_empty_session_omits_filter() {
        let coordinator = ExportCoordinator::new("main.mp4", &ExportConfig::default());
        let command = coordinator
            .build_command(&CompilationSession::new(), Path::new("out.mp4"))
            .unwrap();
        assert_eq!(command, strings(&["-i", "main.mp4", "out.mp4"]));
    }

    #[test]
    fn test_fade_out_placeholder_is_resolved_from_probe() {
        let mut session = CompilationSession::new();
        session.register(logo().fade_out(2.0)).unwrap();

        let probe = FakeProbe::new("h264", 30.0);
        let coordinator =
            ExportCoordinator::new("main.mp4", &ExportConfig::default()).with_probe(&probe);
        let command = coordinator
            .build_command(&session, Path::new("out.mp4"))
            .unwrap();

        let graph = &command[5];
        assert!(graph.contains("fade=t=out:st=28:d=2:alpha='1'"));
        assert!(!graph.contains("VIDEO_LENGTH"));
        assert_eq!(probe.calls.get(), 1);
    }

    #[test]
    fn test_explicit_time_range_needs_no_probe() {
        let mut session = CompilationSession::new();
        session
            .register(
                logo()
                    .fade_out(2.0)
                    .time_range(TimeRange::new(0.0, 12.0).unwrap()),
            )
            .unwrap();

        let coordinator = ExportCoordinator::new("main.mp4", &ExportConfig::default());
        let command = coordinator
            .build_command(&session, Path::new("out.mp4"))
            .unwrap();
        assert!(command[5].contains("fade=t=out:st=10:d=2:alpha='1'"));
    }

    #[test]
    fn test_unresolved_placeholder_without_probe() {
        let mut session = CompilationSession::new();
        session.register(logo().fade_out(2.0)).unwrap();

        let coordinator = ExportCoordinator::new("main.mp4", &ExportConfig::default());
        let err = coordinator
            .build_command(&session, Path::new("out.mp4"))
            .unwrap_err();

        assert!(matches!(
            err,
            CompositorError::Config(ConfigError::UnresolvedPlaceholder { ref token })
                if token == "{VIDEO_LENGTH-2}"
        ));
    }

    #[test]
    fn test_probe_failure_propagates_as_probe_error() {
        let mut session = CompilationSession::new();
        session.register(logo().fade_out(1.0)).unwrap();

        let coordinator =
            ExportCoordinator::new("main.mp4", &ExportConfig::default()).with_probe(&BrokenProbe);
        let err = coordinator
            .build_command(&session, Path::new("out.mp4"))
            .unwrap_err();
        assert!(matches!(err, CompositorError::Probe(ProbeError::Failed { .. })));
    }

    #[test]
    fn test_dangling_label_halts_build() {
        let mut session = CompilationSession::new();
        session
            .register(
                Overlay::draw_box(Color::new("black").unwrap())
                    .dimension(Dimension::new(10, 10).unwrap())
                    .position(Position::new(0, 0)),
            )
            .unwrap();

        let coordinator = ExportCoordinator::new("main.mp4", &ExportConfig::default());
        assert!(matches!(
            coordinator.build_command(&session, Path::new("out.mp4")),
            Err(CompositorError::Graph(_))
        ));
    }

    #[test]
    fn test_merge_command_shape() {
        let probe = FakeProbe::new("h264", 10.0);
        let coordinator =
            ExportCoordinator::new("part1.mp4", &ExportConfig::default()).with_probe(&probe);
        let command = coordinator
            .merge_command(
                &[PathBuf::from("part2.mp4"), PathBuf::from("part3.mp4")],
                Path::new("merged.mp4"),
            )
            .unwrap();

        assert_eq!(
            command,
            strings(&[
                "-y",
                "-i",
                "concat:part1.mp4|part2.mp4|part3.mp4",
                "-c",
                "copy",
                "-bsf:a",
                "aac_adtstoasc",
                "merged.mp4",
            ])
        );
    }

    #[test]
    fn test_transport_stream_command_shape() {
        let probe = FakeProbe::new("h264", 10.0);
        let coordinator =
            ExportCoordinator::new("in.mp4", &ExportConfig::default()).with_probe(&probe);
        let command = coordinator
            .transport_stream_command(Path::new("out.ts"))
            .unwrap();

        assert_eq!(
            command,
            strings(&[
                "-y",
                "-i",
                "in.mp4",
                "-c",
                "copy",
                "-bsf:v",
                "h264_mp4toannexb",
                "-f",
                "mpegts",
                "out.ts",
            ])
        );
    }

    #[test]
    fn test_wrong_codec_fails_validation() {
        let probe = FakeProbe::new("hevc", 10.0);
        let coordinator =
            ExportCoordinator::new("in.mp4", &ExportConfig::default()).with_probe(&probe);

        let err = coordinator
            .transport_stream_command(Path::new("out.ts"))
            .unwrap_err();
        assert!(matches!(
            err,
            CompositorError::Validation(ValidationError::UnsupportedCodec { ref found, .. })
                if found == "hevc"
        ));

        let err = coordinator
            .merge_command(&[PathBuf::from("b.mp4")], Path::new("out.mp4"))
            .unwrap_err();
        assert!(matches!(err, CompositorError::Validation(_)));
    }

    #[test]
    fn test_merge_checks_every_segment_codec() {
        let probe = CodecByPath(&[("part1.mp4", "h264"), ("part2.mp4", "h264")]);
        let coordinator =
            ExportCoordinator::new("part1.mp4", &ExportConfig::default()).with_probe(&probe);

        assert!(coordinator
            .merge_command(&[PathBuf::from("part2.mp4")], Path::new("merged.mp4"))
            .is_ok());

        let err = coordinator
            .merge_command(
                &[PathBuf::from("part2.mp4"), PathBuf::from("part3_hevc.mp4")],
                Path::new("merged.mp4"),
            )
            .unwrap_err();
        match err {
            CompositorError::Validation(ValidationError::UnsupportedCodec {
                operation,
                found,
                ..
            }) => {
                assert!(operation.contains("part3_hevc.mp4"));
                assert_eq!(found, "hevc");
            }
            other => panic!("expected an unsupported codec, got {:?}", other),
        }
    }

    #[test]
    fn test_still_image_flag_reaches_graph() {
        let mut session = CompilationSession::new();
        session
            .register(
                Overlay::new(ImageOverlay::new("logo.png").still_image(true))
                    .dimension(Dimension::new(64, 64).unwrap()),
            )
            .unwrap();

        let coordinator = ExportCoordinator::new("main.mp4", &ExportConfig::default());
        let command = coordinator
            .build_command(&session, Path::new("out.mp4"))
            .unwrap();
        assert!(command[5].ends_with("overlay=0:0:shortest='1'"));
    }
}
