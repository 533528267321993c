use std::process::Child;

use tracing::{info, warn};

/// Children of background pipelines that have not been reaped yet.
///
/// The shell polls them once per prompt instead of ignoring `SIGCHLD`, which
/// would also swallow the statuses of foreground stages. Anything still running
/// when the shell exits is left to init.
#[derive(Debug, Default)]
pub struct BackgroundJobs {
    children: Vec<Child>,
}

impl BackgroundJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, child: Child) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.children.iter().map(Child::id).collect()
    }

    /// Collect every child that has terminated, without blocking.
    /// Returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        let before = self.children.len();
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                info!(pid = child.id(), %status, "background job finished");
                false
            }
            Ok(None) => true,
            Err(e) => {
                // nothing more can be learned about this pid
                warn!(pid = child.id(), error = %e, "cannot poll background job");
                false
            }
        });
        before - self.children.len()
    }
}
