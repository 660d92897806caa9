use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for make-loop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target output settings
    pub target: TargetConfig,

    /// External encoder settings
    pub encoder: EncoderConfig,

    /// Pipeline behaviour
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
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
        self.target.validate()?;
        self.encoder.validate()?;
        Ok(())
    }
}

/// Frame rate and duration of the final clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Frames per second of the output
    pub fps: f64,

    /// Duration of the output in seconds
    pub duration: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            fps: 25.0,
            duration: 8.0,
        }
    }
}

impl TargetConfig {
    fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "target.fps".to_string(),
                value: self.fps.to_string()
            }.into());
        }

        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "target.duration".to_string(),
                value: self.duration.to_string()
            }.into());
        }

        Ok(())
    }
}

/// External tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Encoder binary
    pub ffmpeg_path: String,

    /// Prober binary
    pub ffprobe_path: String,

    /// Video codec for the retimed output
    pub video_codec: String,

    /// Drop audio streams from the output
    pub strip_audio: bool,

    /// Overwrite existing files without asking
    pub overwrite: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            video_codec: "h264".to_string(),
            strip_audio: true,
            overwrite: false,
        }
    }
}

impl EncoderConfig {
    fn validate(&self) -> Result<()> {
        let required = [
            ("encoder.ffmpeg_path", &self.ffmpeg_path),
            ("encoder.ffprobe_path", &self.ffprobe_path),
            ("encoder.video_codec", &self.video_codec),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone()
                }.into());
            }
        }

        Ok(())
    }
}

/// Pipeline behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Leave the intermediate looped file on disk
    pub keep_intermediate: bool,
}
