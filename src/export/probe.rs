use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Command;

use image::io::Reader as ImageReader;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::FfmpegConfig;
use crate::error::ProbeError;

/// What the compositor needs to know about a media file
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Codec of the first video stream, e.g. `h264`
    pub video_codec: String,
    pub duration_seconds: f64,
    pub is_still_image: bool,
}

/// Read-only access to media metadata
///
/// The export coordinator consults it for the main video's codec and total
/// duration. Implementations block until the answer is known.
pub trait MediaProbe {
    fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError>;
}

/// Probe backed by the `ffprobe` binary
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: String,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl FfprobeProbe {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &FfmpegConfig) -> Self {
        Self::new(config.probe_binary.clone())
    }

    fn run(&self, path: &Path) -> Result<Vec<u8>, ProbeError> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| ProbeError::Spawn {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                path: path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl MediaProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError> {
        let stdout = self.run(path)?;
        let is_still_image = is_still_image(path);
        let report = parse_probe_output(path, &stdout, is_still_image)?;

        debug!(
            "Probed {}: codec={}, duration={:.2}s, still={}",
            path.display(),
            report.video_codec,
            report.duration_seconds,
            report.is_still_image
        );
        Ok(report)
    }
}

/// True when the file starts with the signature of a picture format
///
/// Only the header is read; the file extension is ignored.
pub fn is_still_image(path: &Path) -> bool {
    let format = File::open(path)
        .and_then(|file| ImageReader::new(BufReader::new(file)).with_guessed_format())
        .map(|reader| reader.format());

    match format {
        Ok(format) => format.is_some(),
        Err(e) => {
            warn!("Could not read {} for image detection: {}", path.display(), e);
            false
        }
    }
}

fn parse_probe_output(
    path: &Path,
    stdout: &[u8],
    is_still_image: bool,
) -> Result<ProbeReport, ProbeError> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| ProbeError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let video = parsed
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ProbeError::NoVideoStream {
            path: path.display().to_string(),
        })?;

    let duration = parsed
        .format
        .as_ref()
        .and_then(|format| format.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|duration| duration.parse::<f64>().ok());

    let duration_seconds = match duration {
        Some(duration) => duration,
        // Single pictures have no timeline
        None if is_still_image => 0.0,
        None => {
            return Err(ProbeError::Parse {
                path: path.display().to_string(),
                reason: "missing duration".to_string(),
            })
        }
    };

    Ok(ProbeReport {
        video_codec: video.codec_name.clone().unwrap_or_default(),
        duration_seconds,
        is_still_image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const H264_OUTPUT: &str = r#"{
        "streams": [
            { "codec_type": "audio", "codec_name": "aac", "duration": "30.02" },
            { "codec_type": "video", "codec_name": "h264", "duration": "29.97" }
        ],
        "format": { "duration": "30.000000" }
    }"#;

    #[test]
    fn test_parse_picks_first_video_stream() {
        let report =
            parse_probe_output(Path::new("in.mp4"), H264_OUTPUT.as_bytes(), false).unwrap();
        assert_eq!(report.video_codec, "h264");
        assert_eq!(report.duration_seconds, 30.0);
        assert!(!report.is_still_image);
    }

    #[test]
    fn test_parse_falls_back_to_stream_duration() {
        let output =
            r#"{ "streams": [ { "codec_type": "video", "codec_name": "vp9", "duration": "12.5" } ] }"#;
        let report = parse_probe_output(Path::new("in.webm"), output.as_bytes(), false).unwrap();
        assert_eq!(report.video_codec, "vp9");
        assert_eq!(report.duration_seconds, 12.5);
    }

    #[test]
    fn test_parse_still_image_without_duration() {
        let output = r#"{ "streams": [ { "codec_type": "video", "codec_name": "png" } ] }"#;
        let report = parse_probe_output(Path::new("logo.png"), output.as_bytes(), true).unwrap();
        assert_eq!(report.duration_seconds, 0.0);
        assert!(report.is_still_image);
    }

    #[test]
    fn test_parse_errors() {
        let audio_only = r#"{ "streams": [ { "codec_type": "audio", "codec_name": "mp3" } ] }"#;
        assert!(matches!(
            parse_probe_output(Path::new("a.mp3"), audio_only.as_bytes(), false),
            Err(ProbeError::NoVideoStream { .. })
        ));

        assert!(matches!(
            parse_probe_output(Path::new("a.mp4"), b"not json", false),
            Err(ProbeError::Parse { .. })
        ));
    }

    #[test]
    fn test_still_image_detection() {
        let dir = tempdir().unwrap();

        let picture = dir.path().join("dot.png");
        image::RgbImage::new(2, 2).save(&picture).unwrap();
        assert!(is_still_image(&picture));

        let clip = dir.path().join("clip.mp4");
        std::fs::write(&clip, b"\x00\x00\x00\x18ftypmp42").unwrap();
        assert!(!is_still_image(&clip));

        // A video named like a picture is still a video
        let disguised = dir.path().join("clip.png");
        std::fs::write(&disguised, b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00").unwrap();
        assert!(!is_still_image(&disguised));

        // Detection only needs the signature, not a decodable body
        let truncated = dir.path().join("truncated.bin");
        std::fs::write(&truncated, b"\x89PNG\r\n\x1a\n\x00\x00").unwrap();
        assert!(is_still_image(&truncated));

        assert!(!is_still_image(&dir.path().join("missing.png")));
    }

    #[test]
    fn test_missing_binary_is_a_spawn_error() {
        let probe = FfprobeProbe::new("overlay-compositor-no-such-ffprobe");
        assert!(matches!(
            probe.probe(Path::new("in.mp4")),
            Err(ProbeError::Spawn { .. })
        ));
    }
}
