use std::fs::{self, DirEntry, ReadDir};

use is_executable::IsExecutable;
use rustyline::{
    Context, Helper, Highlighter, Hinter, Validator,
    completion::{Completer, FilenameCompleter, Pair},
};

use crate::{builtin::BUILTIN_NAMES, env::PathEnv};

/// Completes command names at the start of each stage and file names elsewhere.
#[derive(Helper, Validator, Highlighter, Hinter)]
pub struct ShellCompleter {
    path_env: PathEnv,
    files: FilenameCompleter,
}

impl ShellCompleter {
    pub fn new(path_env: PathEnv) -> Self {
        Self {
            path_env,
            files: FilenameCompleter::new(),
        }
    }

    fn candidate_executable_in_path<'a>(
        prefix: &'a str,
        path_env: &'a PathEnv,
    ) -> impl Iterator<Item = DirEntry> + 'a {
        fn dir_candidate_executable(
            prefix: &str,
            reader: ReadDir,
        ) -> impl Iterator<Item = DirEntry> {
            reader.flatten().filter(move |entry| {
                entry.path().is_executable()
                    && entry.file_name().to_string_lossy().starts_with(prefix)
            })
        }

        path_env
            .iter()
            .filter_map(move |dir| {
                fs::read_dir(dir)
                    .ok()
                    .map(|entries| dir_candidate_executable(prefix, entries))
            })
            .flatten()
    }

    pub fn command_candidates(&self, prefix: &str) -> Vec<Pair> {
        let mut matches: Vec<_> = BUILTIN_NAMES
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|r| r.to_string())
            .chain(
                Self::candidate_executable_in_path(prefix, &self.path_env)
                    .map(|entry| entry.file_name().to_string_lossy().to_string()),
            )
            .map(|cmd| Pair {
                replacement: format!("{} ", cmd),
                display: cmd,
            })
            .collect();
        matches.sort_unstable_by(|a, b| a.display.cmp(&b.display));
        matches.dedup_by(|a, b| a.display == b.display);
        matches
    }
}

/// Where the word under the cursor starts, and whether it is in command position.
pub fn word_at(line: &str, pos: usize) -> (usize, bool) {
    let head = &line[..pos];
    let start = head
        .char_indices()
        .rev()
        .find(|&(_, c)| c.is_whitespace() || matches!(c, '|' | '<' | '>' | '&'))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let before = head[..start].trim_end();
    let command_position = before.is_empty() || before.ends_with('|');
    (start, command_position)
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, command_position) = word_at(line, pos);
        let word = &line[start..pos];

        // a word with a slash is a path even in command position
        if command_position && !word.contains('/') {
            return Ok((start, self.command_candidates(word)));
        }

        self.files.complete(line, pos, ctx)
    }
}
