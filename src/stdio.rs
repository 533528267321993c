use std::{
    io::{self, Write},
    os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd},
};

/// Copies of the shell's original stdin and stdout, taken once at startup.
///
/// Whatever happens to descriptors 0 and 1 during a cycle, `restore` puts the
/// terminal back on them before the next prompt.
#[derive(Debug)]
pub struct SavedStdio {
    stdin: OwnedFd,
    stdout: OwnedFd,
}

impl SavedStdio {
    pub fn capture() -> io::Result<Self> {
        // close-on-exec duplicates, so stages never inherit them
        let stdin = io::stdin().as_fd().try_clone_to_owned()?;
        let stdout = io::stdout().as_fd().try_clone_to_owned()?;
        Ok(Self { stdin, stdout })
    }

    pub fn stdin(&self) -> BorrowedFd<'_> {
        self.stdin.as_fd()
    }

    pub fn restore(&self) -> io::Result<()> {
        // anything buffered belongs to the stream being replaced
        io::stdout().flush()?;
        dup_onto(self.stdin.as_raw_fd(), libc::STDIN_FILENO)?;
        dup_onto(self.stdout.as_raw_fd(), libc::STDOUT_FILENO)?;
        Ok(())
    }
}

fn dup_onto(saved: RawFd, slot: RawFd) -> io::Result<()> {
    unsafe {
        if libc::dup2(saved, slot) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
