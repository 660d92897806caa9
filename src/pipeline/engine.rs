use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    error::{ConfigError, EncoderError, Result},
    looping::{intermediate_path, CommandBuilder, LoopPlan},
    video::{EncoderCommand, EncoderRunner, Prober},
};

/// Everything needed to produce a loop, computed before any encoder runs
#[derive(Debug, Clone, PartialEq)]
pub struct LoopJob {
    pub plan: LoopPlan,
    pub input: PathBuf,
    pub intermediate: PathBuf,
    pub output: PathBuf,
    pub loop_command: EncoderCommand,
    pub retime_command: EncoderCommand,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub plan: LoopPlan,
    pub output: PathBuf,
    pub intermediate_removed: bool,
}

/// Drives the probe, loop, retime and cleanup steps in order
///
/// Each step awaits its subprocess before the next begins:
/// 1. Probe - Read frame rate and frame count of the input
/// 2. Loop - Concatenate the input with its reverse into the intermediate file
/// 3. Retime - Resample to the target fps and scale timestamps to the target duration
/// 4. Cleanup - Remove the intermediate file
pub struct LoopEngine {
    config: Config,
    prober: Box<dyn Prober>,
    runner: Box<dyn EncoderRunner>,
}

impl LoopEngine {
    pub fn new(config: Config, prober: Box<dyn Prober>, runner: Box<dyn EncoderRunner>) -> Self {
        Self { config, prober, runner }
    }

    /// Probe the input and build both invocations without running them
    pub async fn plan<I: AsRef<Path>, O: AsRef<Path>>(&self, input: I, output: O) -> Result<LoopJob> {
        let input = input.as_ref();
        let output = output.as_ref();

        let intermediate = intermediate_path(input);
        if output == intermediate {
            return Err(ConfigError::InvalidValue {
                key: "output".to_string(),
                value: format!("{} (reserved for the intermediate loop file)", output.display()),
            }.into());
        }

        info!("Step 1: Probing {:?}", input);
        let metadata = self.prober.probe(input).await?;
        let plan = LoopPlan::new(metadata, &self.config.target)?;

        info!("   Source: {} frames @ {} fps", plan.source.frame_count, plan.source.fps);
        info!("   Loop: {} frames, {:.3}s", plan.loop_frame_count, plan.looped_duration);
        info!("   Speed coefficient: {} ({:.3}s @ {} fps)",
              plan.speed_coefficient, plan.retimed_duration(), plan.target_fps);

        let builder = CommandBuilder::new(&self.config.encoder);
        let loop_command = builder.loop_command(input, &intermediate, &plan);
        let retime_command = builder.retime_command(&intermediate, output, &plan);

        debug!("Loop command: {}", loop_command);
        debug!("Retime command: {}", retime_command);

        Ok(LoopJob {
            plan,
            input: input.to_path_buf(),
            intermediate,
            output: output.to_path_buf(),
            loop_command,
            retime_command,
        })
    }

    /// Run the whole pipeline
    pub async fn run<I: AsRef<Path>, O: AsRef<Path>>(&self, input: I, output: O) -> Result<LoopReport> {
        let job = self.plan(input, output).await?;
        self.execute(job).await
    }

    /// Run the encoder invocations of a prepared job
    ///
    /// A failing invocation aborts the run. The intermediate file is left in
    /// place in that case.
    pub async fn execute(&self, job: LoopJob) -> Result<LoopReport> {
        info!("Step 2: Building loop into {:?}", job.intermediate);
        self.run_stage("building loop", &job.loop_command).await?;

        info!("Step 3: Retiming into {:?}", job.output);
        if let Err(e) = self.run_stage("retiming", &job.retime_command).await {
            warn!("Intermediate file left at {:?}", job.intermediate);
            return Err(e);
        }

        let intermediate_removed = if self.config.pipeline.keep_intermediate {
            info!("Step 4: Keeping intermediate file {:?}", job.intermediate);
            false
        } else {
            info!("Step 4: Removing intermediate file");
            tokio::fs::remove_file(&job.intermediate).await?;
            true
        };

        info!("All done! Video saved to {:?}", job.output);

        Ok(LoopReport {
            plan: job.plan,
            output: job.output,
            intermediate_removed,
        })
    }

    async fn run_stage(&self, stage: &str, command: &EncoderCommand) -> Result<()> {
        let output = self.runner.run(command).await?;

        if output.success {
            return Ok(());
        }

        error!("Encoder failed while {} (exit code {:?})", stage, output.code);
        for line in output.stderr.lines().rev().take(5).collect::<Vec<_>>().into_iter().rev() {
            error!("   {}", line);
        }

        Err(EncoderError::Failed {
            stage: stage.to_string(),
            code: output.code,
            stderr: output.stderr,
        }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoopError;
    use crate::video::{EncoderOutput, VideoMetadata};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct FixedProber {
        frame_count: u64,
        fps: f64,
    }

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, path: &Path) -> Result<VideoMetadata> {
            Ok(VideoMetadata::from_frames(path, self.frame_count, self.fps))
        }
    }

    /// Records every command and writes its last argument as the output
    /// file, refusing to replace an existing file unless `-y` was passed
    #[derive(Clone, Default)]
    struct FakeRunner {
        calls: Arc<Mutex<Vec<EncoderCommand>>>,
        fail_at: Option<usize>,
    }

    impl FakeRunner {
        fn failing_at(index: usize) -> Self {
            Self { fail_at: Some(index), ..Self::default() }
        }

        fn calls(&self) -> Vec<EncoderCommand> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EncoderRunner for FakeRunner {
        async fn run(&self, command: &EncoderCommand) -> Result<EncoderOutput> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(command.clone());
                calls.len() - 1
            };

            if self.fail_at == Some(index) {
                return Ok(EncoderOutput::failed(1, "Conversion failed!"));
            }

            // Retime reads its input; it must already exist
            let input = &command.args[command.args.iter().position(|a| a == "-i").unwrap() + 1];
            assert!(Path::new(input).exists(), "missing input {}", input);

            // ffmpeg with stdin closed refuses to overwrite without -y
            let target = command.args.last().unwrap();
            if Path::new(target).exists() && !command.args.iter().any(|a| a == "-y") {
                return Ok(EncoderOutput::failed(1, "Not overwriting - exiting"));
            }

            std::fs::write(target, b"video").unwrap();
            Ok(EncoderOutput::succeeded())
        }
    }

    fn engine(config: Config, runner: FakeRunner) -> LoopEngine {
        let prober = FixedProber { frame_count: 100, fps: 10.0 };
        LoopEngine::new(config, Box::new(prober), Box::new(runner))
    }

    #[tokio::test]
    async fn test_successful_run_removes_intermediate() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("wave.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"source").unwrap();

        let runner = FakeRunner::default();
        let report = engine(Config::default(), runner.clone())
            .run(&input, &output)
            .await
            .unwrap();

        assert_eq!(report.plan.loop_frame_count, 200);
        assert_eq!(report.plan.looped_duration, 20.0);
        assert!(report.intermediate_removed);
        assert!(output.exists());
        assert!(!dir.path().join("wave_looped.mp4").exists());

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args.last().unwrap(), &dir.path().join("wave_looped.mp4").to_string_lossy());
        assert_eq!(calls[1].args[1], dir.path().join("wave_looped.mp4").to_string_lossy());
    }

    #[tokio::test]
    async fn test_loop_failure_stops_pipeline() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("wave.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"source").unwrap();

        let runner = FakeRunner::failing_at(0);
        let result = engine(Config::default(), runner.clone()).run(&input, &output).await;

        match result {
            Err(LoopError::Encoder(EncoderError::Failed { stage, code, stderr })) => {
                assert_eq!(stage, "building loop");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "Conversion failed!");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(runner.calls().len(), 1);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_retime_failure_keeps_intermediate() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("wave.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"source").unwrap();

        let runner = FakeRunner::failing_at(1);
        let result = engine(Config::default(), runner.clone()).run(&input, &output).await;

        assert!(matches!(result, Err(LoopError::Encoder(EncoderError::Failed { .. }))));
        assert!(!output.exists());
        assert!(dir.path().join("wave_looped.mp4").exists());
    }

    #[tokio::test]
    async fn test_leftover_intermediate_is_overwritten() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("wave.mp4");
        let output = dir.path().join("out.mp4");
        let leftover = dir.path().join("wave_looped.mp4");
        std::fs::write(&input, b"source").unwrap();
        std::fs::write(&leftover, b"stale").unwrap();

        let runner = FakeRunner::default();
        let report = engine(Config::default(), runner.clone())
            .run(&input, &output)
            .await
            .unwrap();

        assert!(report.intermediate_removed);
        assert!(output.exists());
        assert!(!leftover.exists());
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_output_needs_overwrite() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("wave.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"source").unwrap();
        std::fs::write(&output, b"previous").unwrap();

        let result = engine(Config::default(), FakeRunner::default()).run(&input, &output).await;
        assert!(matches!(result, Err(LoopError::Encoder(EncoderError::Failed { .. }))));

        let mut config = Config::default();
        config.encoder.overwrite = true;
        engine(config, FakeRunner::default()).run(&input, &output).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_output_may_not_be_the_intermediate() {
        let runner = FakeRunner::default();
        let result = engine(Config::default(), runner.clone())
            .run(Path::new("clips/wave.mov"), "clips/wave_looped.mp4")
            .await;

        assert!(matches!(result, Err(LoopError::Config(ConfigError::InvalidValue { .. }))));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_keep_intermediate() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("wave.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"source").unwrap();

        let mut config = Config::default();
        config.pipeline.keep_intermediate = true;

        let report = engine(config, FakeRunner::default()).run(&input, &output).await.unwrap();

        assert!(!report.intermediate_removed);
        assert!(dir.path().join("wave_looped.mp4").exists());
    }

    #[tokio::test]
    async fn test_plan_is_deterministic_and_runs_nothing() {
        let runner = FakeRunner::default();
        let engine = engine(Config::default(), runner.clone());

        let first = engine.plan("in.mp4", "out.mp4").await.unwrap();
        let second = engine.plan("in.mp4", "out.mp4").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.intermediate, PathBuf::from("in_looped.mp4"));
        assert!((first.plan.speed_coefficient - 0.4).abs() < 1e-12);
        assert!(runner.calls().is_empty());
    }
}
