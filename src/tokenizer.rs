//! Splitting of an input line into sub-commands and of a sub-command into arguments.
//!
//! Both passes are zero-copy: every segment and argument is a slice borrowed from the
//! line owned by the interactive loop. There is no quoting or escaping, so a `;` or a
//! blank always acts as a delimiter.

use crate::error::ParseError;

/// Maximum number of non-empty sub-commands on one line.
pub const MAX_COMMANDS: usize = 10;

/// Size of an exec argument list, counting its terminating null entry.
pub const MAX_ARGS: usize = 64;

/// Number of usable argument slots per sub-command.
pub const MAX_ARG_SLOTS: usize = MAX_ARGS - 1;

const COMMAND_DELIMITER: char = ';';
const SEGMENT_BLANKS: [char; 2] = [' ', '\t'];
const ARGUMENT_DELIMITERS: [char; 5] = [' ', '\t', '\n', '\r', '\x07'];

/// Splits a line into sub-commands on `;`.
///
/// Each piece is trimmed of spaces and tabs at both ends, and pieces that end up empty are
/// dropped without counting towards the limit.
///
/// # Returns
/// The segments in their original order, or [`ParseError::TooManyCommands`] when the line
/// holds more than [`MAX_COMMANDS`] non-empty segments. In that case nothing on the line
/// should run.
pub fn split_commands(line: &str) -> Result<Vec<&str>, ParseError> {
    let mut commands = Vec::with_capacity(MAX_COMMANDS);
    for piece in line.split(COMMAND_DELIMITER) {
        let segment = piece.trim_matches(&SEGMENT_BLANKS[..]);
        if segment.is_empty() {
            continue;
        }
        if commands.len() == MAX_COMMANDS {
            return Err(ParseError::TooManyCommands);
        }
        commands.push(segment);
    }
    Ok(commands)
}

/// Splits one sub-command into its argument vector.
///
/// Runs of space, tab, newline, carriage return and bell all separate arguments. Element 0
/// of the result is the command name. A blank segment gives an empty vector, which callers
/// skip silently.
///
/// # Returns
/// [`ParseError::TooManyArguments`] if there are more than [`MAX_ARG_SLOTS`] arguments.
pub fn split_arguments(segment: &str) -> Result<Vec<&str>, ParseError> {
    let mut args = Vec::new();
    for token in segment
        .split(&ARGUMENT_DELIMITERS[..])
        .filter(|token| !token.is_empty())
    {
        if args.len() == MAX_ARG_SLOTS {
            return Err(ParseError::TooManyArguments);
        }
        args.push(token);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_trimmed_and_ordered() {
        let segments = split_commands("  ls ; cd /tmp ;  echo hi  ").unwrap();
        assert_eq!(segments, vec!["ls", "cd /tmp", "echo hi"]);
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(split_commands(";;  ;\t;").unwrap(), Vec::<&str>::new());
        assert_eq!(split_commands(";ls;;pwd;").unwrap(), vec!["ls", "pwd"]);
    }

    #[test]
    fn test_segment_trim_keeps_inner_blanks() {
        assert_eq!(split_commands("\t echo  a \t b\t ").unwrap(), vec!["echo  a \t b"]);
    }

    #[test]
    fn test_ten_commands_are_accepted() {
        let line = vec!["true"; MAX_COMMANDS].join(";");
        assert_eq!(split_commands(&line).unwrap().len(), MAX_COMMANDS);
    }

    #[test]
    fn test_eleven_commands_are_rejected() {
        let line = vec!["true"; MAX_COMMANDS + 1].join(" ; ");
        assert_eq!(split_commands(&line), Err(ParseError::TooManyCommands));
    }

    #[test]
    fn test_empty_pieces_do_not_count_towards_limit() {
        let mut line = vec!["true"; MAX_COMMANDS].join(";");
        line.push_str(";  ; \t ;");
        assert_eq!(split_commands(&line).unwrap().len(), MAX_COMMANDS);
    }

    #[test]
    fn test_segments_borrow_from_line() {
        let line = String::from("a;b");
        let segments = split_commands(&line).unwrap();
        let range = line.as_bytes().as_ptr_range();
        for segment in segments {
            assert!(range.contains(&segment.as_ptr()));
        }
    }

    #[test]
    fn test_single_argument() {
        assert_eq!(split_arguments("cd").unwrap(), vec!["cd"]);
    }

    #[test]
    fn test_arguments_split_on_every_delimiter() {
        assert_eq!(split_arguments("cd /a /b").unwrap(), vec!["cd", "/a", "/b"]);
        assert_eq!(
            split_arguments("echo\ta\nb\rc\x07d   e").unwrap(),
            vec!["echo", "a", "b", "c", "d", "e"]
        );
    }

    #[test]
    fn test_blank_segment_has_no_arguments() {
        assert!(split_arguments("").unwrap().is_empty());
        assert!(split_arguments(" \t\r\n\x07 ").unwrap().is_empty());
    }

    #[test]
    fn test_argument_limit() {
        let at_limit = vec!["x"; MAX_ARG_SLOTS].join(" ");
        assert_eq!(split_arguments(&at_limit).unwrap().len(), MAX_ARG_SLOTS);

        let over_limit = vec!["x"; MAX_ARG_SLOTS + 1].join(" ");
        assert_eq!(split_arguments(&over_limit), Err(ParseError::TooManyArguments));
    }

    #[test]
    fn test_semicolons_are_not_argument_delimiters() {
        assert_eq!(split_arguments("a;b").unwrap(), vec!["a;b"]);
    }
}
