//! # Loop Arithmetic and Command Construction
//!
//! Pure code: computes the loop frame count and speed coefficient from probed
//! metadata, then assembles the encoder argument lists. Nothing here touches
//! the filesystem or spawns processes.

pub mod command;
pub mod plan;

pub use command::{intermediate_path, CommandBuilder};
pub use plan::LoopPlan;
