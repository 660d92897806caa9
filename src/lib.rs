//! # make-loop
//!
//! Turn a video into a seamless loop: the clip plays forward, then in reverse,
//! and the result is retimed to a target frame rate and duration.
//!
//! All decoding, filtering and encoding is done by FFmpeg. This library probes
//! the input, computes the loop frame count and speed coefficient, builds the
//! two encoder invocations and runs them in order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use make_loop::{
//!     config::Config,
//!     pipeline::LoopEngine,
//!     video::{FfmpegRunner, FfprobeProber},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let prober = FfprobeProber::new(config.encoder.ffprobe_path.clone());
//!
//! let engine = LoopEngine::new(config, Box::new(prober), Box::new(FfmpegRunner::new()));
//! let report = engine.run("wave.mp4", "wave_loop.mp4").await?;
//!
//! println!("Speed coefficient: {}", report.plan.speed_coefficient);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`looping`] - Loop arithmetic and encoder argument construction
//! - [`video`] - FFmpeg/ffprobe process wrappers
//! - [`pipeline`] - The probe, loop, retime and cleanup sequence
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
pub mod looping;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{LoopError, Result},
    looping::LoopPlan,
    pipeline::LoopEngine,
};
