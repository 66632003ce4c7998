use thiserror::Error;

/// Main error type for the overlay compositor
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Filter graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Descriptor and pre-flight validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Filter \"{kind}\" error: missing {field}")]
    MissingField { kind: String, field: String },

    #[error("Invalid value for {field}: {details}")]
    InvalidValue { field: String, details: String },

    #[error("only one color-key filter per session")]
    DuplicateColorKey,

    #[error("Unsupported overlay kind \"{kind}\". Only colorkey, image, text, box are supported")]
    UnsupportedKind { kind: String },

    #[error("{operation} requires a {expected} video stream, found {found}")]
    UnsupportedCodec {
        operation: String,
        expected: String,
        found: String,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Filter graph still contains {token} and no duration probe is available")]
    UnresolvedPlaceholder { token: String },
}

/// Filter graph compilation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Segment {segment} consumes label [{label}] which no earlier segment produced")]
    DanglingLabel { label: String, segment: usize },
}

/// Media probe errors
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run {binary}: {reason}")]
    Spawn { binary: String, reason: String },

    #[error("Probe failed for {path}: {stderr}")]
    Failed { path: String, stderr: String },

    #[error("Unreadable probe output for {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("No video stream found in {path}")]
    NoVideoStream { path: String },
}

/// Errors raised while running the transcoding engine
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to start {binary}: {reason}")]
    Spawn { binary: String, reason: String },

    #[error("Encoding failed with exit code {code:?}: {stderr}")]
    ExecutionFailed { code: Option<i32>, stderr: String },
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl ValidationError {
    pub(crate) fn missing<K: Into<String>, F: Into<String>>(kind: K, field: F) -> Self {
        Self::MissingField {
            kind: kind.into(),
            field: field.into(),
        }
    }

    pub(crate) fn invalid<F: Into<String>, D: Into<String>>(field: F, details: D) -> Self {
        Self::InvalidValue {
            field: field.into(),
            details: details.into(),
        }
    }
}

impl CompositorError {
    /// Check if the caller can fix the input and retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Config(_) => true,
            // A missing ffprobe binary might be installed in between
            Self::Probe(ProbeError::Spawn { .. }) => true,
            Self::Io(_) => true,
            // Execution failures are terminal for the call that produced them
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Config(ConfigError::UnresolvedPlaceholder { .. }) => {
                "A fade-out depends on the video length but the video could not be probed. \
                 Give the overlay an explicit time range or configure ffprobe."
                    .to_string()
            }
            Self::Probe(ProbeError::Spawn { binary, .. })
            | Self::Export(ExportError::Spawn { binary, .. }) => {
                format!("Could not run '{}'. Please check it is installed and on PATH.", binary)
            }
            Self::Export(ExportError::ExecutionFailed { code, stderr }) => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                format!("ffmpeg exited with {}:\n{}", code, stderr.trim())
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_recoverable() {
        let err: CompositorError = ValidationError::DuplicateColorKey.into();
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Validation error: only one color-key filter per session"
        );
    }

    #[test]
    fn test_execution_failure_is_terminal() {
        let err: CompositorError = ExportError::ExecutionFailed {
            code: Some(1),
            stderr: "Invalid filtergraph".to_string(),
        }
        .into();
        assert!(!err.is_recoverable());
        assert!(err.user_message().contains("exited with 1"));
    }

    #[test]
    fn test_placeholder_failure_is_distinct_from_execution() {
        let err: CompositorError = ConfigError::UnresolvedPlaceholder {
            token: "{VIDEO_LENGTH-2}".to_string(),
        }
        .into();
        assert!(matches!(err, CompositorError::Config(_)));
        assert!(!matches!(err, CompositorError::Export(_)));
    }
}
