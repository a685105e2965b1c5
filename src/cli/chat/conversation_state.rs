use chrono::Local;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn label(&self) -> &'static str {
        match self {
            Author::User => "You",
            Author::Assistant => "Guruji",
        }
    }
}

/// A single entry in the conversation. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    author: Author,
    text: String,
    timestamp: String,
}

impl Message {
    pub fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
            timestamp: display_time(),
        }
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Everything the presentation layer is allowed to read.
///
/// Only the controller holds a mutable reference; messages are append-only.
#[derive(Debug, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    pending: bool,
    theme: Theme,
    compose: String,
}

impl ConversationState {
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn add_user_message(&mut self, message: &str) {
        self.messages.push(Message::new(Author::User, message));
    }

    pub fn add_assistant_message(&mut self, message: &str) {
        self.messages.push(Message::new(Author::Assistant, message));
    }

    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub(crate) fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn compose(&self) -> &str {
        &self.compose
    }

    pub(crate) fn compose_mut(&mut self) -> &mut String {
        &mut self.compose
    }
}

// Same shape as a browser's en-US `toLocaleTimeString`, e.g. "3:04:05 PM".
fn display_time() -> String {
    Local::now().format("%-I:%M:%S %p").to_string()
}
