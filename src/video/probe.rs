use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ProbeError, Result};
use crate::video::types::VideoMetadata;

/// Source of video metadata
#[async_trait]
pub trait Prober: Send + Sync {
    /// Read frame rate, frame count and duration of the first video stream
    async fn probe(&self, path: &Path) -> Result<VideoMetadata>;
}

/// Prober backed by the external `ffprobe` binary
pub struct FfprobeProber {
    program: String,
}

impl FfprobeProber {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        let path_str = path.display().to_string();

        let output = Command::new(&self.program)
            .args([
                "-v", "error",
                "-select_streams", "v:0",
                "-show_entries", "stream=r_frame_rate,avg_frame_rate,nb_frames,duration:format=duration",
                "-of", "json",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| ProbeError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                path: path_str,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }.into());
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let metadata = parse_probe_output(path, &json)?;

        info!("Video metadata: {} frames @ {:.3} fps, {:.2}s",
              metadata.frame_count, metadata.fps, metadata.duration);

        Ok(metadata)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Turn ffprobe's JSON output into validated metadata
pub fn parse_probe_output(path: &Path, json: &str) -> Result<VideoMetadata> {
    let path_str = path.display().to_string();

    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| ProbeError::Parse {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    let stream = parsed.streams.into_iter().next()
        .ok_or_else(|| ProbeError::NoVideoStream { path: path_str.clone() })?;

    // avg_frame_rate is "0/0" for some containers
    let fps = stream.avg_frame_rate.as_deref().and_then(parse_rational)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rational))
        .ok_or_else(|| ProbeError::InvalidMetadata {
            path: path_str.clone(),
            details: "frame rate not reported".to_string(),
        })?;

    let duration = stream.duration.as_deref().and_then(parse_positive)
        .or_else(|| parsed.format.and_then(|f| f.duration.as_deref().and_then(parse_positive)));

    let frame_count = stream.nb_frames.as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .or_else(|| duration.map(|d| (d * fps).round() as u64))
        .ok_or_else(|| ProbeError::InvalidMetadata {
            path: path_str.clone(),
            details: "neither frame count nor duration reported".to_string(),
        })?;

    debug!("Probed {}: fps={}, frames={}, duration={:?}", path_str, fps, frame_count, duration);

    if frame_count == 0 {
        return Err(ProbeError::InvalidMetadata {
            path: path_str,
            details: "video has no frames".to_string(),
        }.into());
    }

    Ok(VideoMetadata {
        path: path.to_path_buf(),
        fps,
        frame_count,
        duration: duration.unwrap_or(frame_count as f64 / fps),
    })
}

/// Parse "num/den" or a plain number into a positive frame rate
fn parse_rational(value: &str) -> Option<f64> {
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.trim().parse().ok()?,
    };

    (rate.is_finite() && rate > 0.0).then_some(rate)
}

fn parse_positive(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}
