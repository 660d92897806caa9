//! # Loop Pipeline
//!
//! Orchestrates probing, loop building, retiming and cleanup.

pub mod engine;

pub use engine::{LoopEngine, LoopJob, LoopReport};
