use std::{fmt, path::PathBuf, slice};

/// One stage of a pipeline: a program, its arguments and optional redirections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    args: Vec<String>,
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    is_background: bool,
}

impl CommandDescriptor {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            args: vec![program.into()],
            input_path: None,
            output_path: None,
            is_background: false,
        }
    }

    /// Returns `None` when `args` is empty, since a stage needs a program.
    pub fn from_args(args: Vec<String>) -> Option<Self> {
        if args.is_empty() {
            return None;
        }
        Some(Self {
            args,
            input_path: None,
            output_path: None,
            is_background: false,
        })
    }

    pub fn with_arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_background(mut self, background: bool) -> Self {
        self.is_background = background;
        self
    }

    pub fn program(&self) -> &str {
        &self.args[0]
    }

    /// Arguments after the program name.
    pub fn arguments(&self) -> &[String] {
        &self.args[1..]
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input_path.as_ref()
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }

    pub fn is_background(&self) -> bool {
        self.is_background
    }
}

/// Trace form: `|ls| |-l| in< a.txt out> b.txt`
impl fmt::Display for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arg in &self.args {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "|{}|", arg)?;
            first = false;
        }
        if let Some(input) = &self.input_path {
            write!(f, " in< {}", input.display())?;
        }
        if let Some(output) = &self.output_path {
            write!(f, " out> {}", output.display())?;
        }
        if self.is_background {
            f.write_str(" &")?;
        }
        Ok(())
    }
}

/// `cmd1 | cmd2 | ... | cmdN`, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSequence {
    stages: Vec<CommandDescriptor>,
}

impl CommandSequence {
    pub fn new(stages: Vec<CommandDescriptor>) -> Option<Self> {
        if stages.is_empty() {
            None
        } else {
            Some(Self { stages })
        }
    }

    pub fn first(&self) -> &CommandDescriptor {
        &self.stages[0]
    }

    pub fn last(&self) -> &CommandDescriptor {
        &self.stages[self.stages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    // A sequence is never empty, but clippy wants the pair.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, CommandDescriptor> {
        self.stages.iter()
    }

    /// Only the last stage's flag counts.
    pub fn is_background(&self) -> bool {
        self.last().is_background()
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a CommandDescriptor;
    type IntoIter = slice::Iter<'a, CommandDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_trace_format() {
        let stage = CommandDescriptor::new("sort")
            .with_arg("-r")
            .with_input("in.txt")
            .with_output("out.txt");
        assert_eq!(stage.to_string(), "|sort| |-r| in< in.txt out> out.txt");

        let stage = CommandDescriptor::new("sleep").with_arg("5").with_background(true);
        assert_eq!(stage.to_string(), "|sleep| |5| &");
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(CommandDescriptor::from_args(Vec::new()).is_none());
        assert!(CommandSequence::new(Vec::new()).is_none());
    }

    #[test]
    fn background_comes_from_last_stage() {
        let sequence = CommandSequence::new(vec![
            CommandDescriptor::new("yes").with_background(true),
            CommandDescriptor::new("head"),
        ])
        .unwrap();
        assert!(!sequence.is_background());
        assert_eq!(sequence.first().program(), "yes");
        assert_eq!(sequence.last().program(), "head");
        assert_eq!(sequence.len(), 2);
    }
}
