//! FFmpeg execution adapter
//!
//! Renders a [`StitchPlan`] with a single ffmpeg invocation driven as a
//! subprocess. Output goes to a hidden temporary file next to the
//! destination and is renamed into place only after ffmpeg succeeds.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::errors::{ExecutionError, FatalReason};
use crate::engine::{ExecutionContext, ProgressReporter};
use crate::planner::StitchPlan;
use crate::ports::StitchExecutor;

pub mod command;
pub mod progress;

pub use command::{EncoderSettings, FfmpegCommand};
use progress::{parse_progress_line, FfmpegProgress, StderrLine};

/// Diagnostic lines kept for error classification
const STDERR_TAIL_LINES: usize = 32;

/// Stitch executor backed by the ffmpeg binary
pub struct FfmpegExecutor {
    binary: PathBuf,
    encoder: EncoderSettings,
}

impl FfmpegExecutor {
    /// `binary` is a name looked up on `PATH` or a path to the executable
    pub fn new(binary: impl Into<PathBuf>, encoder: EncoderSettings) -> Self {
        Self {
            binary: binary.into(),
            encoder,
        }
    }

    pub fn encoder(&self) -> &EncoderSettings {
        &self.encoder
    }

    fn resolve_binary(&self) -> Result<PathBuf, ExecutionError> {
        which::which(&self.binary).map_err(|e| {
            ExecutionError::fatal(
                FatalReason::BackendUnavailable,
                format!("{}: {}", self.binary.display(), e),
            )
        })
    }

    async fn run(
        &self,
        binary: &Path,
        cmd: &FfmpegCommand,
        total_seconds: f64,
        mut context: ExecutionContext,
    ) -> Result<(), ExecutionError> {
        let args = cmd.build_args();
        debug!("Running: {} {}", binary.display(), args.join(" "));

        let mut child = Command::new(binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ExecutionError::fatal(FatalReason::BackendUnavailable, e.to_string())
                }
                _ => ExecutionError::transient(format!("failed to start ffmpeg: {}", e)),
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecutionError::transient("ffmpeg stderr was not captured"))?;
        let reporter = context.progress().clone();
        let reader = tokio::spawn(read_stderr(stderr, reporter, total_seconds));

        let outcome = tokio::select! {
            status = child.wait() => Some(status),
            _ = context.cancelled() => None,
        };

        let status = match outcome {
            Some(status) => status,
            None => {
                info!("Stitch cancelled, stopping ffmpeg");
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill ffmpeg: {}", e);
                }
                reader.abort();
                return Err(ExecutionError::Cancelled);
            }
        };

        let status = status
            .map_err(|e| ExecutionError::transient(format!("failed to wait for ffmpeg: {}", e)))?;
        let tail = reader.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(classify_failure(&tail.join("\n"), status.code()))
        }
    }
}

#[async_trait]
impl StitchExecutor for FfmpegExecutor {
    async fn execute(
        &self,
        plan: &StitchPlan,
        context: ExecutionContext,
    ) -> Result<PathBuf, ExecutionError> {
        let binary = self.resolve_binary()?;

        for input in plan.input_paths() {
            let is_file = tokio::fs::metadata(input)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                return Err(ExecutionError::fatal(
                    FatalReason::MissingInput,
                    input.display().to_string(),
                ));
            }
        }

        let destination = plan.output_path().to_path_buf();
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let unwritable = |e: std::io::Error| {
            ExecutionError::fatal(
                FatalReason::OutputUnwritable,
                format!("{}: {}", dir.display(), e),
            )
        };
        tokio::fs::create_dir_all(&dir).await.map_err(unwritable)?;

        // Removed on drop unless persisted
        let temp_dir = dir.clone();
        let temp = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".stitch_")
                .suffix(".mp4")
                .tempfile_in(&temp_dir)
                .map(|file| file.into_temp_path())
        })
        .await
        .map_err(|e| ExecutionError::transient(format!("temp file task failed: {}", e)))?
        .map_err(unwritable)?;

        info!(
            week = %plan.week_id(),
            clips = plan.transforms().len(),
            duration = plan.output_duration_seconds(),
            "Rendering weekly film"
        );

        let progress = context.progress().clone();
        let cmd = command::stitch_command(plan, &self.encoder, &temp);
        self.run(&binary, &cmd, plan.output_duration_seconds(), context)
            .await?;

        let written = tokio::fs::metadata(&temp)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(ExecutionError::fatal(
                FatalReason::Backend,
                "ffmpeg reported success but wrote no output",
            ));
        }

        let target = destination.clone();
        tokio::task::spawn_blocking(move || temp.persist(&target))
            .await
            .map_err(|e| ExecutionError::transient(format!("persist task failed: {}", e)))?
            .map_err(|e| {
                ExecutionError::fatal(
                    FatalReason::OutputUnwritable,
                    format!("{}: {}", destination.display(), e.error),
                )
            })?;

        progress.complete();
        info!("Weekly film written to {}", destination.display());
        Ok(destination)
    }

    async fn is_available(&self) -> bool {
        self.resolve_binary().is_ok()
    }
}

/// Drain ffmpeg's stderr, forwarding progress and keeping a tail of
/// diagnostic lines
async fn read_stderr(
    stderr: tokio::process::ChildStderr,
    reporter: ProgressReporter,
    total_seconds: f64,
) -> Vec<String> {
    let mut lines = BufReader::new(stderr).lines();
    let mut current = FfmpegProgress::default();
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Ok(Some(line)) = lines.next_line().await {
        match parse_progress_line(&line, &mut current) {
            StderrLine::Progress(progress) if !progress.is_complete => {
                // Completion is reported once the file is in place
                reporter.report(progress.fraction(total_seconds).min(0.99));
            }
            StderrLine::Progress(_) | StderrLine::ProgressField => {}
            StderrLine::Diagnostic => {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }
    }

    tail.into_iter().collect()
}

/// Map ffmpeg's diagnostics and exit code to an execution error
pub fn classify_failure(stderr: &str, exit_code: Option<i32>) -> ExecutionError {
    let lower = stderr.to_ascii_lowercase();
    let detail = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("ffmpeg failed without output")
        .trim()
        .to_string();

    if lower.contains("no space left") {
        return ExecutionError::fatal(FatalReason::NoSpace, detail);
    }
    if lower.contains("no such file") {
        return ExecutionError::fatal(FatalReason::MissingInput, detail);
    }
    if lower.contains("invalid data found")
        || lower.contains("moov atom not found")
        || lower.contains("error while decoding")
    {
        return ExecutionError::fatal(FatalReason::CorruptInput, detail);
    }
    if lower.contains("permission denied") || lower.contains("read-only file system") {
        return ExecutionError::fatal(FatalReason::OutputUnwritable, detail);
    }
    if lower.contains("resource temporarily unavailable")
        || lower.contains("device or resource busy")
        || lower.contains("cannot allocate memory")
        || lower.contains("out of memory")
    {
        return ExecutionError::transient(detail);
    }

    match exit_code {
        // Terminated by a signal
        None => ExecutionError::transient(format!("ffmpeg was killed: {}", detail)),
        Some(code) => ExecutionError::fatal(
            FatalReason::Backend,
            format!("ffmpeg exited with status {}: {}", code, detail),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_fatal_reasons() {
        let cases = [
            ("av_interleaved_write_frame(): No space left on device", FatalReason::NoSpace),
            ("/clips/3.mp4: No such file or directory", FatalReason::MissingInput),
            ("/clips/3.mp4: Invalid data found when processing input", FatalReason::CorruptInput),
            ("[mov,mp4 @ 0x1] moov atom not found", FatalReason::CorruptInput),
            ("/out/x.mp4: Permission denied", FatalReason::OutputUnwritable),
            ("Unknown encoder 'libx265'", FatalReason::Backend),
        ];
        for (stderr, expected) in cases {
            match classify_failure(stderr, Some(1)) {
                ExecutionError::Fatal { reason, .. } => assert_eq!(reason, expected, "{}", stderr),
                other => panic!("expected fatal for {:?}, got {:?}", stderr, other),
            }
        }
    }

    #[test]
    fn test_classify_transient() {
        for stderr in [
            "Resource temporarily unavailable",
            "Device or resource busy",
            "Cannot allocate memory",
        ] {
            assert!(classify_failure(stderr, Some(1)).is_retryable(), "{}", stderr);
        }

        // Killed by a signal with no diagnostics
        assert!(classify_failure("", None).is_retryable());
    }

    #[test]
    fn test_classify_detail_is_last_line() {
        let err = classify_failure("first\nsecond\n\n", Some(234));
        assert_eq!(
            err,
            ExecutionError::fatal(FatalReason::Backend, "ffmpeg exited with status 234: second")
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let executor = FfmpegExecutor::new(
            "/nonexistent/weekreel-ffmpeg",
            EncoderSettings::default(),
        );
        assert!(!executor.is_available().await);
    }
}
