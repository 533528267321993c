pub mod process;
pub mod reaper;

use std::{
    io::{self, PipeReader},
    mem,
    process::Child,
};

use tracing::debug;

use crate::{
    command::CommandSequence,
    error::PipelineError,
    execution::{process::StageBuilder, reaper::BackgroundJobs},
    result::PipelineOutcome,
};

/// Runs `cmd1 | cmd2 | ... | cmdN`.
///
/// Every stage is started before any of them is waited for, so a producer can
/// never stall on a full pipe whose reader does not exist yet. Stage `i + 1`
/// gets stage `i`'s read end as its stdin; the shell's own descriptors 0 and 1
/// are never touched.
///
/// Only the last stage can run in the background: with a trailing `&` it goes
/// to `jobs`, while every stage before it is still waited for. This returns
/// once all non-background stages have terminated.
pub fn execute_pipeline(
    sequence: &CommandSequence,
    jobs: &mut BackgroundJobs,
) -> Result<PipelineOutcome, PipelineError> {
    /// children started so far; if the pipeline is abandoned they are waited
    /// for, or handed to the reaper when the line ended in `&`
    struct ExecChainGuard<'a> {
        processes: Vec<Child>,
        jobs: Option<&'a mut BackgroundJobs>,
    }

    impl Drop for ExecChainGuard<'_> {
        fn drop(&mut self) {
            match self.jobs.as_deref_mut() {
                Some(jobs) => {
                    for child in self.processes.drain(..) {
                        jobs.push(child);
                    }
                }
                None => {
                    for mut child in self.processes.drain(..) {
                        let _ = child.wait();
                    }
                }
            }
        }
    }

    let background = sequence.is_background();
    let last = sequence.len() - 1;
    let mut pool = ExecChainGuard {
        processes: Vec::with_capacity(sequence.len()),
        jobs: background.then_some(jobs),
    };

    let mut pending_input: Option<PipeReader> = None;
    for (index, stage) in sequence.iter().enumerate() {
        let (next_input, pipe_out) = if index < last {
            let (reader, writer) = io::pipe().map_err(PipelineError::Pipe)?;
            (Some(reader), Some(writer))
        } else {
            (None, None)
        };

        let mut builder = StageBuilder::new(stage);
        builder.background(background && index == last);
        if let Some(reader) = pending_input.take() {
            builder.stdin(reader);
        }
        if let Some(writer) = pipe_out {
            builder.pipe_out(writer);
        }

        // On failure the earlier stages lose their reader and see EPIPE,
        // so the guard's waits terminate.
        let child = builder.spawn()?;
        debug!(pid = child.id(), stage = index, program = stage.program(), "stage started");
        pool.processes.push(child);

        pending_input = next_input;
    }

    let mut children = mem::take(&mut pool.processes);
    let background_child = if background { children.pop() } else { None };
    let background_pid = match (background_child, pool.jobs.take()) {
        (Some(child), Some(jobs)) => {
            let pid = child.id();
            jobs.push(child);
            Some(pid)
        }
        _ => None,
    };

    let mut statuses = Vec::with_capacity(children.len());
    let mut failure = None;
    for (mut child, stage) in children.into_iter().zip(sequence) {
        match child.wait() {
            Ok(status) => {
                debug!(pid = child.id(), %status, program = stage.program(), "stage finished");
                statuses.push(status);
            }
            Err(source) => {
                failure.get_or_insert(PipelineError::Wait {
                    program: stage.program().to_owned(),
                    source,
                });
            }
        }
    }

    match (failure, background_pid) {
        (Some(err), _) => Err(err),
        (None, Some(pid)) => Ok(PipelineOutcome::Background { statuses, pid }),
        (None, None) => Ok(PipelineOutcome::Completed(statuses)),
    }
}
