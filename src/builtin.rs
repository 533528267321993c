use std::{
    env, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{command::CommandSequence, env::home_dir, error::CdError};

pub const CD: &str = "cd";

/// Builtins the shell understands, for completion and `type`-like lookups.
pub const BUILTIN_NAMES: [&str; 2] = [CD, "exit"];

/// One-slot directory history behind `cd -`.
#[derive(Debug, Clone)]
pub struct DirHistory {
    previous: PathBuf,
}

impl DirHistory {
    pub fn new(start: PathBuf) -> Self {
        Self { previous: start }
    }

    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::new(env::current_dir()?))
    }

    pub fn previous(&self) -> &Path {
        &self.previous
    }

    fn record_current(&mut self) {
        // if the cwd has been removed under us, keep the old entry
        if let Ok(cwd) = env::current_dir() {
            self.previous = cwd;
        }
    }
}

/// `cd` is only recognised as the very first word of the line; the rest of
/// the pipeline is ignored.
pub fn is_builtin(sequence: &CommandSequence) -> bool {
    sequence.first().program() == CD
}

fn navigate(path: &Path) -> Result<(), CdError> {
    env::set_current_dir(path).map_err(|source| CdError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(dir = %path.display(), "changed directory");
    Ok(())
}

/// `cd [path|-|~]`, with `args` being the words after `cd`.
///
/// - `path` or `~`: remember the current directory, then move. The entry is
///   updated even when the move fails.
/// - `-`: go back to the remembered directory without updating it, so a
///   second `cd -` stays put.
/// - nothing: same as `~`. Without a known home directory nothing happens.
pub fn cd_command(args: &[String], dirs: &mut DirHistory) -> Result<(), CdError> {
    match args.first().map(String::as_str) {
        Some("-") => navigate(dirs.previous()),
        None | Some("~") => {
            // When $HOME is unknown, `bash` complains while `zsh` does nothing.
            // We follow `zsh` here.
            match home_dir() {
                Some(home) => {
                    dirs.record_current();
                    navigate(&home)
                }
                None => Ok(()),
            }
        }
        Some(path) => {
            dirs.record_current();
            navigate(Path::new(path))
        }
    }
}
