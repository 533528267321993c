use std::path::PathBuf;

use directories::BaseDirs;

pub const LOG_ENV: &str = "PIPESH_LOG";
pub const FAIL_FAST_ENV: &str = "PIPESH_FAIL_FAST";
pub const HISTFILE_ENV: &str = "HISTFILE";

const DEFAULT_LOG_FILTER: &str = "warn";
const HISTORY_FILE_NAME: &str = "pipesh_history";

/// What happens when a stage cannot be started (unknown program, bad redirection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageFailurePolicy {
    /// Report it, drop the rest of the pipeline and prompt again.
    #[default]
    Abandon,
    /// Report it and leave the shell with the fatal status.
    ExitShell,
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub history_file: Option<PathBuf>,
    pub failure_policy: StageFailurePolicy,
    /// `tracing_subscriber::EnvFilter` directives.
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            failure_policy: StageFailurePolicy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Self {
        let default_history =
            BaseDirs::new().map(|dirs| dirs.data_local_dir().join(HISTORY_FILE_NAME));
        Self::from_lookup(|key| std::env::var(key).ok(), default_history)
    }

    pub fn from_lookup<F>(lookup: F, default_history: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let history_file = lookup(HISTFILE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or(default_history);

        let failure_policy = match lookup(FAIL_FAST_ENV) {
            Some(value) if parse_flag(&value) => StageFailurePolicy::ExitShell,
            _ => StageFailurePolicy::Abandon,
        };

        let log_filter = lookup(LOG_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            history_file,
            failure_policy,
            log_filter,
        }
    }

    pub fn with_failure_policy(mut self, policy: StageFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ShellConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| vars.get(key).cloned(), Some(PathBuf::from("/data/h")))
    }

    #[test]
    fn defaults() {
        let config = config(&[]);
        assert_eq!(config.history_file, Some(PathBuf::from("/data/h")));
        assert_eq!(config.failure_policy, StageFailurePolicy::Abandon);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn environment_overrides() {
        let config = config(&[
            (HISTFILE_ENV, "/tmp/hist"),
            (FAIL_FAST_ENV, "Yes"),
            (LOG_ENV, "pipesh=debug"),
        ]);
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/hist")));
        assert_eq!(config.failure_policy, StageFailurePolicy::ExitShell);
        assert_eq!(config.log_filter, "pipesh=debug");
    }

    #[test]
    fn unrecognised_flag_keeps_the_shell_alive() {
        let config = config(&[(FAIL_FAST_ENV, "0"), (HISTFILE_ENV, "")]);
        assert_eq!(config.failure_policy, StageFailurePolicy::Abandon);
        assert_eq!(config.history_file, Some(PathBuf::from("/data/h")));
    }
}
