use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{EncoderError, Result};
use crate::video::types::{EncoderCommand, EncoderOutput};

/// Executes encoder invocations
///
/// Implementations must wait for the process to finish before returning; the
/// pipeline relies on this to order its file operations.
#[async_trait]
pub trait EncoderRunner: Send + Sync {
    async fn run(&self, command: &EncoderCommand) -> Result<EncoderOutput>;
}

/// Runs commands as real subprocesses
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegRunner;

impl FfmpegRunner {
    pub fn new() -> Self {
        Self
    }

    /// Check that `program -version` runs and exits cleanly
    pub async fn check_available(program: &str) -> Result<()> {
        let status = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|_| EncoderError::NotFound { program: program.to_string() })?;

        if status.success() {
            Ok(())
        } else {
            Err(EncoderError::NotFound { program: program.to_string() }.into())
        }
    }
}

#[async_trait]
impl EncoderRunner for FfmpegRunner {
    async fn run(&self, command: &EncoderCommand) -> Result<EncoderOutput> {
        debug!("Running: {}", command);

        // stdin is closed so an overwrite prompt fails instead of blocking
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => EncoderError::NotFound { program: command.program.clone() },
                _ => EncoderError::Spawn {
                    program: command.program.clone(),
                    reason: e.to_string(),
                },
            })?;

        Ok(EncoderOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
