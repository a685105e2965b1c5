/// Slash commands understood by the chat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    ToggleTheme,
    ToggleEmojiBar,
    /// 1-based position in the emoji bar. Zero means "not a number".
    InsertEmoji(usize),
}

impl Command {
    /// Parse a line typed at the prompt. Lines that are not a known command
    /// return `None` and are sent to the chat as-is.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.trim().split_whitespace();
        let command = match words.next()? {
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            "/theme" => Command::ToggleTheme,
            "/emoji" => match words.next() {
                None => Command::ToggleEmojiBar,
                Some(n) => Command::InsertEmoji(n.parse().unwrap_or(0)),
            },
            _ => return None,
        };
        Some(command)
    }

    /// The line editor is pre-filled with the compose text, so a command is
    /// whatever the user typed after it.
    pub fn parse_after_compose(compose: &str, line: &str) -> Option<Self> {
        let typed = line.strip_prefix(compose).unwrap_or(line);
        Self::parse(typed)
    }
}
