use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the overlay compositor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External binaries
    pub ffmpeg: FfmpegConfig,

    /// Export policy
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.ffmpeg.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

/// Locations of the transcoding engine and its probe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// ffmpeg executable, looked up on PATH when not absolute
    pub binary: String,

    /// ffprobe executable
    pub probe_binary: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            probe_binary: "ffprobe".to_string(),
        }
    }
}

impl FfmpegConfig {
    fn validate(&self) -> Result<()> {
        if self.binary.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "ffmpeg.binary".to_string(),
            }
            .into());
        }

        if self.probe_binary.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "ffmpeg.probe_binary".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// How commands are assembled and run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Video codec required by stream-copy exports (concat merge, MPEG-TS)
    pub required_codec: String,

    /// Pass `-y` to ffmpeg so existing outputs are replaced
    pub overwrite: bool,

    /// Log every assembled command line at INFO level
    pub log_commands: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            required_codec: "h264".to_string(),
            overwrite: true,
            log_commands: false,
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<()> {
        if self.required_codec.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "export.required_codec".to_string(),
                value: self.required_codec.clone(),
            }
            .into());
        }

        Ok(())
    }
}
