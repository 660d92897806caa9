use std::path::{Path, PathBuf};

use crate::config::EncoderConfig;
use crate::looping::plan::LoopPlan;
use crate::video::types::EncoderCommand;

/// Suffix appended to the input stem for the intermediate file
pub const LOOPED_SUFFIX: &str = "_looped";

/// Path of the intermediate loop file, placed next to the input
///
/// `clips/wave.mov` becomes `clips/wave_looped.mp4`. Only the final
/// extension is replaced.
pub fn intermediate_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    input.with_file_name(format!("{}{}.mp4", stem, LOOPED_SUFFIX))
}

/// Render a float the same way regardless of platform: integral values keep
/// one decimal place, everything else uses the shortest round-trip form.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Filter graph that appends a reversed copy and re-stamps frames at the source rate
pub fn loop_filter(plan: &LoopPlan) -> String {
    format!(
        "[0]reverse[r];[0][r]concat,loop=0:{},setpts=N/{}/TB",
        plan.loop_frame_count,
        format_float(plan.source.fps)
    )
}

/// Filter chain that resamples to the target rate and scales timestamps
pub fn retime_filter(plan: &LoopPlan) -> String {
    format!(
        "fps={}, setpts={}*PTS",
        format_float(plan.target_fps),
        format_float(plan.speed_coefficient)
    )
}

/// Builds the two encoder invocations of the pipeline
pub struct CommandBuilder<'a> {
    encoder: &'a EncoderConfig,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(encoder: &'a EncoderConfig) -> Self {
        Self { encoder }
    }

    fn base(&self, overwrite: bool) -> EncoderCommand {
        let command = EncoderCommand::new(self.encoder.ffmpeg_path.clone());
        if overwrite {
            command.arg("-y")
        } else {
            command
        }
    }

    /// Reverse + concat + loop, writing the intermediate file
    ///
    /// The intermediate is always overwritten; a failed earlier run may have
    /// left one behind.
    pub fn loop_command(&self, input: &Path, intermediate: &Path, plan: &LoopPlan) -> EncoderCommand {
        self.base(true)
            .arg("-i")
            .arg(input.to_string_lossy())
            .arg("-filter_complex")
            .arg(loop_filter(plan))
            .arg(intermediate.to_string_lossy())
    }

    /// fps + setpts retime, reading the intermediate file and writing the output
    pub fn retime_command(&self, intermediate: &Path, output: &Path, plan: &LoopPlan) -> EncoderCommand {
        let mut command = self.base(self.encoder.overwrite)
            .arg("-i")
            .arg(intermediate.to_string_lossy())
            .arg("-vcodec")
            .arg(self.encoder.video_codec.clone());

        if self.encoder.strip_audio {
            command = command.arg("-an");
        }

        command
            .arg("-vf")
            .arg(retime_filter(plan))
            .arg(output.to_string_lossy())
    }
}
