pub mod builtin;
pub mod command;
pub mod completion;
pub mod config;
pub mod env;
pub mod error;
pub mod execution;
pub mod parse;
pub mod prompt;
pub mod redirect;
pub mod result;
pub mod shell;
pub mod stdio;

use crate::{result::CycleOutcome, shell::Shell};

/// Reap finished background jobs, then run one line.
pub fn get_input_and_run(input: &str, shell: &mut Shell) -> CycleOutcome {
    shell.reap_background();
    shell.run_line(input)
}
