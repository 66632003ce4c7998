use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use crate::config::FfmpegConfig;
use crate::error::ExportError;

/// Runs ffmpeg with an argument list produced by the export coordinator
///
/// One attempt per call; a failed run is reported with its exit code and
/// captured stderr and never retried.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    binary: String,
}

impl FfmpegRunner {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &FfmpegConfig) -> Self {
        Self::new(config.binary.clone())
    }

    pub async fn run(&self, args: &[String]) -> Result<(), ExportError> {
        info!("Running {} with {} argument(s)", self.binary, args.len());

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExportError::Spawn {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!("{} exited with {:?}", self.binary, output.status.code());
            return Err(ExportError::ExecutionFailed {
                code: output.status.code(),
                stderr,
            });
        }

        info!("{} finished successfully", self.binary);
        Ok(())
    }
}
