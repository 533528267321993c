use std::{iter::Peekable, mem, path::PathBuf, vec};

use crate::{
    command::{CommandDescriptor, CommandSequence},
    error::ParseError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Pipe,
    Input,
    Output,
    Background,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    // To build the current word
    let mut str_builder = String::new();
    // `''` is still a word even though nothing gets pushed
    let mut in_word = false;
    let mut single_quote = false;
    let mut double_quote = false;
    let mut backslash = false;

    fn flush_word(tokens: &mut Vec<Token>, str_builder: &mut String, in_word: &mut bool) {
        if *in_word {
            tokens.push(Token::Word(mem::take(str_builder)));
            *in_word = false;
        }
    }

    for c in input.chars() {
        if single_quote {
            if c == '\'' {
                single_quote = false;
            } else {
                str_builder.push(c);
            }
            continue;
        }

        if double_quote {
            // Within double quotes, a backslash only escapes `"`, `\`, `$` and `` ` ``.
            // For all other characters the backslash is kept.
            if backslash {
                match c {
                    '"' | '\\' | '$' | '`' => {}
                    _ => str_builder.push('\\'),
                }
                str_builder.push(c);
                backslash = false;
                continue;
            }

            match c {
                '"' => double_quote = false,
                '\\' => backslash = true,
                _ => str_builder.push(c),
            }
            continue;
        }

        if backslash {
            str_builder.push(c);
            backslash = false;
            continue;
        }

        match c {
            '\\' => {
                backslash = true;
                in_word = true;
            }
            '\'' => {
                single_quote = true;
                in_word = true;
            }
            '"' => {
                double_quote = true;
                in_word = true;
            }
            '|' | '<' | '>' | '&' => {
                // operators need no surrounding blanks: `sort<in.txt>out.txt`
                flush_word(&mut tokens, &mut str_builder, &mut in_word);
                tokens.push(match c {
                    '|' => Token::Pipe,
                    '<' => Token::Input,
                    '>' => Token::Output,
                    _ => Token::Background,
                });
            }
            _ if c.is_whitespace() => flush_word(&mut tokens, &mut str_builder, &mut in_word),
            _ => {
                str_builder.push(c);
                in_word = true;
            }
        }
    }

    if single_quote {
        return Err(ParseError::UnterminatedQuote { quote: '\'' });
    }
    if double_quote {
        return Err(ParseError::UnterminatedQuote { quote: '"' });
    }
    if backslash {
        return Err(ParseError::DanglingEscape);
    }

    // Don't forget the last word
    flush_word(&mut tokens, &mut str_builder, &mut in_word);
    Ok(tokens)
}

#[derive(Default)]
struct PendingStage {
    args: Vec<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    background: bool,
}

impl PendingStage {
    fn finish(self) -> Result<CommandDescriptor, ParseError> {
        let mut stage = CommandDescriptor::from_args(self.args)
            .ok_or(ParseError::EmptyStage)?
            .with_background(self.background);
        if let Some(input) = self.input {
            stage = stage.with_input(input);
        }
        if let Some(output) = self.output {
            stage = stage.with_output(output);
        }
        Ok(stage)
    }
}

fn redirect_target(
    tokens: &mut Peekable<vec::IntoIter<Token>>,
    operator: char,
    slot: &mut Option<PathBuf>,
) -> Result<(), ParseError> {
    match tokens.next() {
        Some(Token::Word(target)) => {
            if slot.replace(PathBuf::from(target)).is_some() {
                return Err(ParseError::DuplicateRedirect { operator });
            }
            Ok(())
        }
        _ => Err(ParseError::MissingRedirectTarget { operator }),
    }
}

/// Turns one input line into a pipeline.
///
/// A blank line yields `Ok(None)`. A trailing `&` marks the last stage as
/// background; `&` anywhere else is an error.
pub fn parse_line(input: &str) -> Result<Option<CommandSequence>, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut stages = Vec::new();
    let mut pending = PendingStage::default();
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        match token {
            Token::Word(word) => pending.args.push(word),
            Token::Input => redirect_target(&mut tokens, '<', &mut pending.input)?,
            Token::Output => redirect_target(&mut tokens, '>', &mut pending.output)?,
            Token::Pipe => stages.push(mem::take(&mut pending).finish()?),
            Token::Background => {
                if tokens.peek().is_some() {
                    return Err(ParseError::MisplacedBackground);
                }
                pending.background = true;
            }
        }
    }
    stages.push(pending.finish()?);

    CommandSequence::new(stages)
        .map(Some)
        .ok_or(ParseError::EmptyStage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> CommandSequence {
        parse_line(input).unwrap().unwrap()
    }

    fn words(stage: &CommandDescriptor) -> Vec<&str> {
        stage.args().iter().map(String::as_str).collect()
    }

    #[test]
    fn blank_lines_yield_nothing() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t "), Ok(None));
    }

    #[test]
    fn splits_pipeline_stages() {
        let sequence = parse("ls -l /tmp | grep foo |wc -l");
        assert_eq!(sequence.len(), 3);
        let stages: Vec<_> = sequence.iter().map(words).collect();
        assert_eq!(
            stages,
            vec![vec!["ls", "-l", "/tmp"], vec!["grep", "foo"], vec!["wc", "-l"]]
        );
        assert!(!sequence.is_background());
    }

    #[test]
    fn redirections_without_blanks() {
        let sequence = parse("sort<in.txt>out.txt -r");
        let stage = sequence.first();
        assert_eq!(words(stage), vec!["sort", "-r"]);
        assert_eq!(stage.input_path(), Some(&PathBuf::from("in.txt")));
        assert_eq!(stage.output_path(), Some(&PathBuf::from("out.txt")));
    }

    #[test]
    fn quotes_and_escapes() {
        let sequence = parse(r#"echo 'a | b' "c  \"d\" \x" e\ f '' "#);
        assert_eq!(
            words(sequence.first()),
            vec!["echo", "a | b", r#"c  "d" \x"#, "e f", ""]
        );
    }

    #[test]
    fn trailing_ampersand_marks_last_stage() {
        let sequence = parse("sleep 5 | cat &");
        assert!(sequence.is_background());
        assert!(!sequence.first().is_background());

        let sequence = parse("sleep 5&");
        assert!(sequence.is_background());
        assert_eq!(words(sequence.first()), vec!["sleep", "5"]);
    }

    #[test]
    fn malformed_lines_are_reported() {
        assert_eq!(
            parse_line("echo 'abc"),
            Err(ParseError::UnterminatedQuote { quote: '\'' })
        );
        assert_eq!(
            parse_line("echo \"abc"),
            Err(ParseError::UnterminatedQuote { quote: '"' })
        );
        assert_eq!(parse_line("echo abc\\"), Err(ParseError::DanglingEscape));
        assert_eq!(
            parse_line("cat <"),
            Err(ParseError::MissingRedirectTarget { operator: '<' })
        );
        assert_eq!(
            parse_line("echo > | cat"),
            Err(ParseError::MissingRedirectTarget { operator: '>' })
        );
        assert_eq!(
            parse_line("echo >> out"),
            Err(ParseError::MissingRedirectTarget { operator: '>' })
        );
        assert_eq!(
            parse_line("echo > a > b"),
            Err(ParseError::DuplicateRedirect { operator: '>' })
        );
        assert_eq!(parse_line("| cat"), Err(ParseError::EmptyStage));
        assert_eq!(parse_line("ls |"), Err(ParseError::EmptyStage));
        assert_eq!(parse_line("ls || cat"), Err(ParseError::EmptyStage));
        assert_eq!(parse_line("< in.txt"), Err(ParseError::EmptyStage));
        assert_eq!(parse_line("&"), Err(ParseError::EmptyStage));
        assert_eq!(
            parse_line("sleep 1 & echo"),
            Err(ParseError::MisplacedBackground)
        );
    }
}
