//! # Video Tooling Module
//!
//! Wraps the external FFmpeg binaries: probing input metadata and running
//! encoder invocations to completion.

pub mod encoder;
pub mod probe;
pub mod types;

pub use encoder::{EncoderRunner, FfmpegRunner};
pub use probe::{FfprobeProber, Prober};
pub use types::{EncoderCommand, EncoderOutput, VideoMetadata};
