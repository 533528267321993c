use std::{io, path::Path};

use tracing::{debug, warn};

use crate::{
    builtin::{self, DirHistory},
    command::CommandSequence,
    config::{ShellConfig, StageFailurePolicy},
    error::PipelineError,
    execution::{self, reaper::BackgroundJobs},
    parse,
    result::{CycleOutcome, PipelineOutcome},
    stdio::SavedStdio,
};

/// Typed before parsing, it leaves the loop.
pub const EXIT: &str = "exit";

/// Process status for pipe/fork failures and, under `ExitShell`, failed stages.
pub const FATAL_STATUS: i32 = 2;

/// Process-wide state of one interactive shell.
#[derive(Debug)]
pub struct Shell {
    config: ShellConfig,
    saved_stdio: SavedStdio,
    dirs: DirHistory,
    jobs: BackgroundJobs,
}

impl Shell {
    /// Takes the standard stream copies and remembers the startup directory.
    pub fn new(config: ShellConfig) -> io::Result<Self> {
        Ok(Self {
            config,
            saved_stdio: SavedStdio::capture()?,
            dirs: DirHistory::from_current_dir()?,
            jobs: BackgroundJobs::new(),
        })
    }

    pub fn previous_dir(&self) -> &Path {
        self.dirs.previous()
    }

    pub fn saved_stdio(&self) -> &SavedStdio {
        &self.saved_stdio
    }

    pub fn background_jobs(&self) -> &BackgroundJobs {
        &self.jobs
    }

    pub fn reap_background(&mut self) -> usize {
        self.jobs.reap()
    }

    pub fn restore_stdio(&self) -> io::Result<()> {
        self.saved_stdio.restore()
    }

    /// One read-eval cycle, minus the reading.
    pub fn run_line(&mut self, line: &str) -> CycleOutcome {
        if line.trim() == EXIT {
            return CycleOutcome::Exit;
        }

        match parse::parse_line(line) {
            Ok(Some(sequence)) => self.execute(&sequence),
            Ok(None) => CycleOutcome::Continue,
            Err(e) => {
                eprintln!("pipesh: parse error: {}", e);
                CycleOutcome::Continue
            }
        }
    }

    pub fn execute(&mut self, sequence: &CommandSequence) -> CycleOutcome {
        trace_sequence(sequence);

        if builtin::is_builtin(sequence) {
            if let Err(e) = builtin::cd_command(sequence.first().arguments(), &mut self.dirs) {
                eprintln!("{}", e);
            }
            return CycleOutcome::Continue;
        }

        match self.run_pipeline(sequence) {
            Ok(outcome) => {
                debug!(success = outcome.success(), "pipeline done");
                CycleOutcome::Continue
            }
            Err(e) if e.is_fatal() => {
                eprintln!("pipesh: {}", e);
                CycleOutcome::Terminate(FATAL_STATUS)
            }
            Err(e) => {
                eprintln!("pipesh: {}", e);
                warn!(error = %e, policy = ?self.config.failure_policy, "stage failed");
                match self.config.failure_policy {
                    StageFailurePolicy::Abandon => CycleOutcome::Continue,
                    StageFailurePolicy::ExitShell => CycleOutcome::Terminate(FATAL_STATUS),
                }
            }
        }
    }

    /// Runs the pipeline and puts the original stdin/stdout back on 0 and 1,
    /// whether the pipeline worked or not.
    pub fn run_pipeline(
        &mut self,
        sequence: &CommandSequence,
    ) -> Result<PipelineOutcome, PipelineError> {
        let result = execution::execute_pipeline(sequence, &mut self.jobs);
        self.saved_stdio.restore().map_err(PipelineError::Restore)?;
        result
    }
}

/// Every parsed stage goes to the diagnostic stream, never to command output.
fn trace_sequence(sequence: &CommandSequence) {
    for (index, stage) in sequence.iter().enumerate() {
        debug!(target: "pipesh::trace", stage = index, "{}", stage);
    }
}
