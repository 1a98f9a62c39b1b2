//! Command line classification.
//!
//! Converts the text typed after `:` into a `ParsedCommand`. The core only
//! executes line jumps (`:12`); every other command is handed to the host
//! untouched, which owns writing, quitting and the like.
//!
//! No side-effects here; pure classification.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Nothing typed (`:` then Enter).
    Empty,
    /// `:n`, one-based as typed.
    GoToLine(usize),
    /// Anything else, trimmed, for the host.
    External(String),
}

pub struct CommandParser;

impl CommandParser {
    /// `raw` is the command line without its leading `:`.
    pub fn parse(raw: &str) -> ParsedCommand {
        let body = raw.trim();
        if body.is_empty() {
            return ParsedCommand::Empty;
        }
        if body.chars().all(|c| c.is_ascii_digit()) {
            // Overlong numbers saturate and clamp to the last line later.
            let line = body.parse::<usize>().unwrap_or(usize::MAX);
            return ParsedCommand::GoToLine(line);
        }
        ParsedCommand::External(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_number() {
        assert_eq!(CommandParser::parse("12"), ParsedCommand::GoToLine(12));
        assert_eq!(CommandParser::parse(" 3 "), ParsedCommand::GoToLine(3));
        assert_eq!(CommandParser::parse("0"), ParsedCommand::GoToLine(0));
    }

    #[test]
    fn parse_huge_line_number_saturates() {
        assert_eq!(
            CommandParser::parse("99999999999999999999999"),
            ParsedCommand::GoToLine(usize::MAX)
        );
    }

    #[test]
    fn parse_empty() {
        assert_eq!(CommandParser::parse(""), ParsedCommand::Empty);
        assert_eq!(CommandParser::parse("   "), ParsedCommand::Empty);
    }

    #[test]
    fn parse_external() {
        assert_eq!(CommandParser::parse("wq"), ParsedCommand::External("wq".into()));
        assert_eq!(
            CommandParser::parse(" w out.txt"),
            ParsedCommand::External("w out.txt".into())
        );
        assert_eq!(CommandParser::parse("3d"), ParsedCommand::External("3d".into()));
    }
}
