use std::fmt;
use std::path::PathBuf;

/// Metadata of an input video, as reported by the prober
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    /// Path to the probed file
    pub path: PathBuf,

    /// Frames per second
    pub fps: f64,

    /// Number of frames in the first video stream
    pub frame_count: u64,

    /// Duration in seconds
    pub duration: f64,
}

impl VideoMetadata {
    /// Create metadata from a frame count and frame rate, deriving the duration
    pub fn from_frames<P: Into<PathBuf>>(path: P, frame_count: u64, fps: f64) -> Self {
        Self {
            path: path.into(),
            fps,
            frame_count,
            duration: frame_count as f64 / fps,
        }
    }
}

/// A fully materialized invocation of an external tool
///
/// Two commands built from the same inputs compare equal, which makes the
/// argument lists easy to assert on and to print in dry runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    /// Binary to execute
    pub program: String,

    /// Arguments, in order
    pub args: Vec<String>,
}

impl EncoderCommand {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for EncoderCommand {
    /// Shell-like rendering, quoting arguments that contain spaces or filter syntax
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || matches!(c, ';' | '[' | ']' | '*')) {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of running an external command to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOutput {
    /// Whether the process exited with status 0
    pub success: bool,

    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,

    /// Captured standard error
    pub stderr: String,
}

impl EncoderOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stderr: stderr.into(),
        }
    }
}
