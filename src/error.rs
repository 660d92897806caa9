use thiserror::Error;

/// Main error type for the make-loop library
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while reading metadata from the input video
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to launch prober '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("Prober failed for {path}: {stderr}")]
    Failed { path: String, stderr: String },

    #[error("Unreadable prober output for {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("No video stream found in {path}")]
    NoVideoStream { path: String },

    #[error("Invalid video metadata for {path}: {details}")]
    InvalidMetadata { path: String, details: String },
}

/// Errors raised by the external encoder
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("Encoder not found: {program}")]
    NotFound { program: String },

    #[error("Failed to launch encoder '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("Encoder failed during {stage} (exit code {code:?}): {stderr}")]
    Failed {
        stage: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using LoopError
pub type Result<T> = std::result::Result<T, LoopError>;

impl LoopError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Encoder(EncoderError::NotFound { program }) => {
                format!("Could not run '{}'. Please install FFmpeg or set encoder.ffmpeg_path in the config file.", program)
            }
            Self::Encoder(EncoderError::Failed { stage, code, .. }) => match code {
                Some(code) => format!("Encoder failed while {} (exit code {}).", stage, code),
                None => format!("Encoder was terminated while {}.", stage),
            },
            Self::Probe(ProbeError::Spawn { program, .. }) => {
                format!("Could not run '{}'. Please install FFmpeg or set encoder.ffprobe_path in the config file.", program)
            }
            Self::Probe(ProbeError::Failed { path, .. }) => {
                format!("Could not read video file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_failed_stage() {
        let err: LoopError = EncoderError::Failed {
            stage: "building loop".to_string(),
            code: Some(1),
            stderr: String::new(),
        }
        .into();

        assert_eq!(err.user_message(), "Encoder failed while building loop (exit code 1).");
    }

    #[test]
    fn test_user_message_falls_back_to_display() {
        let err: LoopError = ConfigError::InvalidValue {
            key: "target.fps".to_string(),
            value: "0".to_string(),
        }
        .into();

        assert_eq!(
            err.user_message(),
            "Configuration error: Invalid configuration value: target.fps = 0"
        );
    }
}
