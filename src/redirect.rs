use std::{
    fs::{File, OpenOptions},
    os::unix::fs::OpenOptionsExt,
    path::Path,
};

use crate::{command::CommandDescriptor, error::PipelineError};

/// Permission bits for output files created by `>`: owner read, write, execute.
pub const OUTPUT_FILE_MODE: u32 = 0o700;

/// Open read-only for `<`.
pub fn open_input(path: &Path) -> Result<File, PipelineError> {
    File::open(path).map_err(|source| PipelineError::Redirect {
        path: path.to_path_buf(),
        source,
    })
}

/// Open for `>`: write, create, truncate.
pub fn open_output(path: &Path) -> Result<File, PipelineError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(OUTPUT_FILE_MODE)
        .open(path)
        .map_err(|source| PipelineError::Redirect {
            path: path.to_path_buf(),
            source,
        })
}

/// Redirection files of one stage, opened by the shell before the stage is spawned.
///
/// Dropping this closes the shell's copies; the child keeps the descriptors it
/// installed on its own standard slots.
#[derive(Debug, Default)]
pub struct StageRedirect {
    pub input: Option<File>,
    pub output: Option<File>,
}

impl StageRedirect {
    /// Input is opened before output, so a missing input file leaves the output
    /// file untouched.
    pub fn open(stage: &CommandDescriptor) -> Result<Self, PipelineError> {
        let input = stage.input_path().map(|p| open_input(p)).transpose()?;
        let output = stage.output_path().map(|p| open_output(p)).transpose()?;
        Ok(Self { input, output })
    }
}
