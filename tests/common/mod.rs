#![allow(dead_code)]

use std::{
    env, fs, mem,
    os::fd::RawFd,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use pipesh::{
    command::CommandSequence,
    config::{ShellConfig, StageFailurePolicy},
    parse::parse_line,
    shell::Shell,
};
use tempfile::TempDir;

/// The working directory is process-wide; tests touching it take this lock.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Holds the lock and puts the original directory back on drop.
pub struct CwdGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl CwdGuard {
    pub fn acquire() -> Self {
        let lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Self {
            original: env::current_dir().unwrap(),
            _lock: lock,
        }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.original);
    }
}

pub fn shell() -> Shell {
    Shell::new(ShellConfig::default()).unwrap()
}

pub fn fail_fast_shell() -> Shell {
    Shell::new(ShellConfig::default().with_failure_policy(StageFailurePolicy::ExitShell)).unwrap()
}

pub fn sequence(line: &str) -> CommandSequence {
    parse_line(line).unwrap().unwrap()
}

/// Scratch directory with a helper for quoted file paths.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            dir: tempfile::Builder::new().prefix("pipesh-tests").tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Single-quoted, ready to splice into a command line.
    pub fn quoted(&self, name: &str) -> String {
        format!("'{}'", self.file(name).display())
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).unwrap()
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.file(name), contents).unwrap();
    }
}

/// (device, inode) of whatever `fd` currently points at.
pub fn fd_identity(fd: RawFd) -> (u64, u64) {
    let mut stat: libc::stat = unsafe { mem::zeroed() };
    let ret = unsafe { libc::fstat(fd, &mut stat) };
    assert_eq!(ret, 0, "fstat({fd}) failed");
    (stat.st_dev as u64, stat.st_ino as u64)
}
