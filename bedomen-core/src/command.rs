//! Chat command parsing.
//!
//! ```text
//! \potion on | off | toggle | status
//! \potion log on | log off
//! \potion               (toggle or usage, per config)
//! ```
//!
//! Matching is case-insensitive. Lines whose first token is not the prefix
//! are not addressed to the automaton and parse to `None`.

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    Toggle,
    SetLogging(bool),
    Status,
}

impl Command {
    pub fn parse(
        text: &str,
        prefix: &str,
        bare_toggles: bool,
    ) -> Result<Option<Command>, CommandError> {
        let mut tokens = text.split_whitespace();
        match tokens.next() {
            Some(first) if first.eq_ignore_ascii_case(prefix) => {}
            _ => return Ok(None),
        }

        let args: Vec<String> = tokens.map(str::to_ascii_lowercase).collect();
        let command = match args.first().map(String::as_str) {
            None if bare_toggles => Command::Toggle,
            None => {
                return Err(CommandError::MissingSubcommand {
                    prefix: prefix.to_string(),
                })
            }
            Some("on") => Command::Enable,
            Some("off") => Command::Disable,
            Some("toggle") => Command::Toggle,
            Some("status") => Command::Status,
            Some("log") => match args.get(1).map(String::as_str) {
                Some("on") => Command::SetLogging(true),
                Some("off") => Command::SetLogging(false),
                Some(other) => {
                    return Err(CommandError::InvalidLogArgument {
                        prefix: prefix.to_string(),
                        given: other.to_string(),
                    })
                }
                None => {
                    return Err(CommandError::MissingLogArgument {
                        prefix: prefix.to_string(),
                    })
                }
            },
            Some(other) => {
                return Err(CommandError::UnknownSubcommand {
                    prefix: prefix.to_string(),
                    given: other.to_string(),
                })
            }
        };
        Ok(Some(command))
    }
}
