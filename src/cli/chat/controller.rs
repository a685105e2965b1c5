use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::conversation_state::{ConversationState, Message, Theme};
use super::persona::{build_prompt, pick_fallback};
use crate::gemini_client::{GeminiError, PromptRequest, TextGenerator};

/// How an outbound request settled.
#[derive(Debug)]
pub enum Outcome {
    Success(String),
    Failure(GeminiError),
}

impl From<Result<String, GeminiError>> for Outcome {
    fn from(result: Result<String, GeminiError>) -> Self {
        match result {
            Ok(text) => Outcome::Success(text),
            Err(e) => Outcome::Failure(e),
        }
    }
}

/// Owns the conversation and is the only thing allowed to change it.
///
/// At most one request is outstanding: [`Controller::submit`] hands back a
/// [`PromptRequest`] only when nothing is pending, and the caller must feed
/// the result of that request to [`Controller::on_response`] exactly once.
pub struct Controller {
    state: ConversationState,
    rng: StdRng,
}

impl Controller {
    pub fn new(theme: Theme) -> Self {
        Self::with_rng(theme, StdRng::from_entropy())
    }

    pub fn with_rng(theme: Theme, rng: StdRng) -> Self {
        Self {
            state: ConversationState::with_theme(theme),
            rng,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.state.get_messages()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn theme(&self) -> Theme {
        self.state.theme()
    }

    pub fn compose(&self) -> &str {
        self.state.compose()
    }

    /// Record a user message and return the request to send, or `None` if
    /// the text is blank or a request is already in flight.
    pub fn submit(&mut self, text: &str) -> Option<PromptRequest> {
        if self.state.is_pending() {
            debug!("Dropping submit while a request is pending");
            return None;
        }
        if is_blank(text) {
            return None;
        }

        self.state.add_user_message(text);
        self.state.compose_mut().clear();
        self.state.set_pending(true);

        Some(build_prompt(text))
    }

    /// Submit whatever is currently in the compose box.
    pub fn submit_compose(&mut self) -> Option<PromptRequest> {
        let text = self.state.compose().to_string();
        self.submit(&text)
    }

    /// Append the reply (or a fallback apology) and release the pending gate.
    ///
    /// Returns the appended message, or `None` for a resolution that has no
    /// matching submit.
    pub fn on_response(&mut self, outcome: Outcome) -> Option<&Message> {
        if !self.state.is_pending() {
            debug!("Ignoring response with no request in flight: {:?}", outcome);
            return None;
        }

        match outcome {
            Outcome::Success(text) => {
                info!("Received reply ({} chars)", text.len());
                self.state.add_assistant_message(&text);
            }
            Outcome::Failure(e) => {
                warn!("Error fetching response: {}", e);
                let fallback = pick_fallback(&mut self.rng);
                self.state.add_assistant_message(fallback);
            }
        }
        self.state.set_pending(false);

        self.state.get_messages().last()
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.state.theme().toggled();
        self.state.set_theme(theme);
        theme
    }

    pub fn insert_emoji(&mut self, symbol: &str) {
        self.state.compose_mut().push_str(symbol);
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        *self.state.compose_mut() = text.into();
    }

    /// Submit `text`, await the generator and resolve. Returns whether the
    /// submit was accepted.
    pub async fn round_trip(&mut self, text: &str, generator: &dyn TextGenerator) -> bool {
        let Some(request) = self.submit(text) else {
            return false;
        };
        let outcome = Outcome::from(generator.generate(&request).await);
        self.on_response(outcome);
        true
    }
}

// A byte-order mark counts as whitespace here, as it does for browser input.
fn is_blank(text: &str) -> bool {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .is_empty()
}
