//! # Chat commands understood by the engine.

/// A parsed chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the live system status report.
    Status,
    /// Start the live network report.
    Network,
    /// Start the live process report.
    Process,
    /// Stop the live report of the chat.
    Stop,
}

impl Command {
    /// Parses a message text into a command.
    ///
    /// Only the first word counts; it must start with `/`. A `@botname` suffix
    /// is dropped and matching is case-insensitive.
    ///
    /// # Example
    /// ```
    /// use hostwatch::Command;
    ///
    /// assert_eq!(Command::parse(" /Status@host_bot now"), Some(Command::Status));
    /// assert_eq!(Command::parse("status"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();
        match name.as_str() {
            "status" => Some(Command::Status),
            "network" => Some(Command::Network),
            "process" => Some(Command::Process),
            "stop" => Some(Command::Stop),
            _ => None,
        }
    }

    /// Returns a short stable label for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::Network => "network",
            Command::Process => "process",
            Command::Stop => "stop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("/status"), Some(Command::Status));
        assert_eq!(Command::parse("/NETWORK"), Some(Command::Network));
        assert_eq!(Command::parse("/process@my_bot"), Some(Command::Process));
        assert_eq!(Command::parse("  /stop please"), Some(Command::Stop));
    }

    #[test]
    fn ignores_everything_else() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/"), None);
        assert_eq!(Command::parse("/start"), None);
        assert_eq!(Command::parse("hello /status"), None);
        assert_eq!(Command::parse("/@bot"), None);
    }
}
