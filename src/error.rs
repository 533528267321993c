use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};

use thiserror::Error;

/// Malformed input line. The cycle is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {quote} quote")]
    UnterminatedQuote { quote: char },
    #[error("backslash at end of line")]
    DanglingEscape,
    #[error("missing file name after `{operator}`")]
    MissingRedirectTarget { operator: char },
    #[error("more than one `{operator}` in one command")]
    DuplicateRedirect { operator: char },
    #[error("missing command around `|`")]
    EmptyStage,
    #[error("`&` is only allowed at the end of the line")]
    MisplacedBackground,
}

#[derive(Debug, Error)]
#[error("cd: {}: {}", .path.display(), describe_io(.source))]
pub struct CdError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("cannot create process: {0}")]
    Fork(#[source] io::Error),
    #[error("cannot restore standard streams: {0}")]
    Restore(#[source] io::Error),
    #[error("{program}: {}", describe_spawn(.source))]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{}: {}", .path.display(), describe_io(.source))]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{program}: wait failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Descriptor or process table trouble the shell cannot recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Pipe(_) | Self::Fork(_) | Self::Restore(_))
    }
}

/// Short, shell-style reason for an I/O error, without the `(os error N)` tail.
pub fn describe_io(err: &io::Error) -> String {
    match err.kind() {
        ErrorKind::NotFound => "No such file or directory".to_string(),
        ErrorKind::PermissionDenied => "Permission denied".to_string(),
        ErrorKind::NotADirectory => "Not a directory".to_string(),
        ErrorKind::IsADirectory => "Is a directory".to_string(),
        _ => err.to_string(),
    }
}

fn describe_spawn(err: &io::Error) -> String {
    match err.kind() {
        ErrorKind::NotFound => "command not found".to_string(),
        _ => describe_io(err),
    }
}
