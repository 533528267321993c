use std::{
    io::{self, Error},
    os::{
        fd::{AsRawFd, OwnedFd, RawFd},
        unix::process::CommandExt,
    },
    process::{Child, Command},
};

use crate::{command::CommandDescriptor, error::PipelineError, redirect::StageRedirect};

/// Signals an interactive shell ignores for itself while its children keep the defaults.
const TERMINAL_SIGNALS: [libc::c_int; 2] = [libc::SIGINT, libc::SIGQUIT];

/// Make Ctrl-C and Ctrl-\ hit the foreground stages only, not the shell.
pub fn ignore_terminal_signals() {
    for sig in TERMINAL_SIGNALS {
        unsafe {
            libc::signal(sig, libc::SIG_IGN);
        }
    }
}

/// Spawns one pipeline stage.
pub struct StageBuilder<'a> {
    stage: &'a CommandDescriptor,
    stdin: Option<OwnedFd>,
    pipe_out: Option<OwnedFd>,
    background: bool,
}

impl<'a> StageBuilder<'a> {
    pub fn new(stage: &'a CommandDescriptor) -> Self {
        Self {
            stage,
            stdin: None,
            pipe_out: None,
            background: false,
        }
    }

    /// Read end carried over from the previous stage.
    pub fn stdin<T: Into<OwnedFd>>(&mut self, fd: T) {
        self.stdin = Some(fd.into());
    }

    /// Write end feeding the next stage.
    pub fn pipe_out<T: Into<OwnedFd>>(&mut self, fd: T) {
        self.pipe_out = Some(fd.into());
    }

    pub fn background(&mut self, background: bool) {
        self.background = background;
    }

    /// Opens the stage's redirections and starts the program.
    ///
    /// Every descriptor handed to the builder is closed in the shell when this
    /// returns, whether or not the spawn worked.
    pub fn spawn(self) -> Result<Child, PipelineError> {
        let redirect = StageRedirect::open(self.stage)?;

        let mut cmd = Command::new(self.stage.program());
        cmd.args(self.stage.arguments());

        // `<` wins over the pipe from the previous stage
        let stdin = redirect.input.map(OwnedFd::from).or(self.stdin);
        if let Some(stdin) = stdin {
            cmd.stdin(stdin);
        }

        // `>` first, then the pipe: the later dup2 wins, so a middle stage with
        // `>` still truncates its file but writes into the pipe.
        let stdout_chain: [Option<RawFd>; 2] = [
            redirect.output.as_ref().map(AsRawFd::as_raw_fd),
            self.pipe_out.as_ref().map(AsRawFd::as_raw_fd),
        ];
        let disposition = if self.background {
            libc::SIG_IGN
        } else {
            libc::SIG_DFL
        };

        unsafe {
            cmd.pre_exec(move || {
                for sig in TERMINAL_SIGNALS {
                    libc::signal(sig, disposition);
                }
                libc::signal(libc::SIGCHLD, libc::SIG_DFL);

                for fd in stdout_chain.into_iter().flatten() {
                    if fd == libc::STDOUT_FILENO {
                        // dup2 onto itself keeps FD_CLOEXEC, so clear it by hand
                        if libc::fcntl(fd, libc::F_SETFD, 0) == -1 {
                            return Err(Error::last_os_error());
                        }
                    } else if libc::dup2(fd, libc::STDOUT_FILENO) == -1 {
                        return Err(Error::last_os_error());
                    }
                }
                Ok(())
            });
        }

        cmd.spawn()
            .map_err(|source| spawn_error(self.stage.program(), source))
        // redirect.output and pipe_out are dropped here, closing the shell's copies
    }
}

/// Running out of processes or memory is the fork failing, anything else is
/// the program itself failing to start.
fn spawn_error(program: &str, source: io::Error) -> PipelineError {
    match source.raw_os_error() {
        Some(libc::EAGAIN) | Some(libc::ENOMEM) => PipelineError::Fork(source),
        _ => PipelineError::Spawn {
            program: program.to_owned(),
            source,
        },
    }
}
