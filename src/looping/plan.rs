use crate::config::TargetConfig;
use crate::error::{ConfigError, ProbeError, Result};
use crate::video::types::VideoMetadata;

/// Frame and timing arithmetic for a forward-then-reverse loop
///
/// The loop plays the source once forward and once reversed, so it holds
/// twice the source frames and lasts twice as long. The speed coefficient
/// scales presentation timestamps so that the loop fits the target duration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopPlan {
    /// Probed source video
    pub source: VideoMetadata,

    /// Frames in the concatenated forward + reversed sequence
    pub loop_frame_count: u64,

    /// Duration of the concatenated sequence in seconds
    pub looped_duration: f64,

    /// Output frame rate
    pub target_fps: f64,

    /// Output duration in seconds
    pub target_duration: f64,

    /// Factor applied to PTS when retiming
    pub speed_coefficient: f64,
}

impl LoopPlan {
    pub fn new(source: VideoMetadata, target: &TargetConfig) -> Result<Self> {
        if !source.fps.is_finite() || source.fps <= 0.0 {
            return Err(ProbeError::InvalidMetadata {
                path: source.path.display().to_string(),
                details: format!("frame rate must be positive, got {}", source.fps),
            }.into());
        }

        if source.frame_count == 0 {
            return Err(ProbeError::InvalidMetadata {
                path: source.path.display().to_string(),
                details: "video has no frames".to_string(),
            }.into());
        }

        if !target.fps.is_finite() || target.fps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "target.fps".to_string(),
                value: target.fps.to_string(),
            }.into());
        }

        if !target.duration.is_finite() || target.duration <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "target.duration".to_string(),
                value: target.duration.to_string(),
            }.into());
        }

        let loop_frame_count = source.frame_count * 2;
        let looped_duration = (source.frame_count as f64 / source.fps) * 2.0;
        let speed_coefficient = target.duration / looped_duration;

        Ok(Self {
            source,
            loop_frame_count,
            looped_duration,
            target_fps: target.fps,
            target_duration: target.duration,
            speed_coefficient,
        })
    }

    /// Duration of the output once the coefficient is applied
    pub fn retimed_duration(&self) -> f64 {
        self.looped_duration * self.speed_coefficient
    }
}
