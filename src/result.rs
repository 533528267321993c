use std::process::ExitStatus;

/// What a finished pipeline left behind.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Exit status of every stage, in pipeline order.
    Completed(Vec<ExitStatus>),
    /// The last stage went to the background reaper; the stages before it
    /// were waited for as usual.
    Background { statuses: Vec<ExitStatus>, pid: u32 },
}

impl PipelineOutcome {
    /// A pipeline succeeds when its last stage does, as in POSIX shells.
    /// Background pipelines count as successful once started.
    pub fn success(&self) -> bool {
        match self {
            Self::Completed(statuses) => statuses.last().is_some_and(ExitStatus::success),
            Self::Background { .. } => true,
        }
    }
}

/// What the read-eval loop should do after one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Continue,
    Exit,
    /// Leave the shell with this process status.
    Terminate(i32),
}
