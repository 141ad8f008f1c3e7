//! A small set of diagnostic severities, printed with [`colored`] rather
//! than through a logging framework.

use colored::Colorize;
use strum_macros::Display;

#[derive(Debug, Display, Eq, PartialEq, Copy, Clone)]
pub enum Message {
    Info,
    Warning,
    /// Printed to `stderr`.
    Error,
    /// Also printed to `stderr`, only shown when debug mode is on.
    Debug,
}

impl Message {
    #[must_use]
    pub fn message_prefix(self) -> &'static str {
        match self {
            Message::Info => "",
            Message::Warning => "Warning:",
            Message::Error => "Error:",
            Message::Debug => "Debug:",
        }
    }

    /// The prefix, coloured to match severity, ready to prepend to a message.
    #[must_use]
    pub fn styled_prefix(self) -> String {
        match self {
            Message::Info => String::new(),
            Message::Warning => self.message_prefix().yellow().to_string(),
            Message::Error => self.message_prefix().red().bold().to_string(),
            Message::Debug => self.message_prefix().dimmed().to_string(),
        }
    }

    /// `stderr` for `Error`/`Debug`, `stdout` for everything else, matching the
    /// teacher's text-output convention.
    #[must_use]
    pub fn goes_to_stderr(self) -> bool {
        matches!(self, Message::Error | Message::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_has_no_prefix() {
        assert_eq!(Message::Info.message_prefix(), "");
    }

    #[test]
    fn error_and_debug_go_to_stderr() {
        assert!(Message::Error.goes_to_stderr());
        assert!(Message::Debug.goes_to_stderr());
        assert!(!Message::Warning.goes_to_stderr());
        assert!(!Message::Info.goes_to_stderr());
    }
}
