use std::sync::mpsc::Receiver;

use rustyline::error::ReadlineError;
use rustyline::{Config, Editor, Result};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// What the line editor thread sends to the chat loop.
#[derive(Debug)]
pub enum InputEvent {
    Line(String),
    Eof,
    Error(String),
}

/// What the chat loop sends back before the next line is read.
#[derive(Debug, Clone)]
pub struct PromptState {
    pub prompt: String,
    pub compose: String,
}

pub fn generate_prompt(pending: bool) -> String {
    if pending { "… " } else { "> " }.to_string()
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}

/// Blocking loop for the input thread. Reads one line per `PromptState`
/// received and stops when either channel closes or input ends.
pub fn read_lines(prompts: Receiver<PromptState>, events: UnboundedSender<InputEvent>) {
    let mut editor = match rl() {
        Ok(editor) => editor,
        Err(e) => {
            let _ = events.send(InputEvent::Error(e.to_string()));
            return;
        }
    };

    while let Ok(state) = prompts.recv() {
        let event = match editor.readline_with_initial(&state.prompt, (state.compose.as_str(), "")) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.as_str());
                }
                InputEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => InputEvent::Eof,
            Err(e) => InputEvent::Error(e.to_string()),
        };

        let last = !matches!(event, InputEvent::Line(_));
        if events.send(event).is_err() || last {
            break;
        }
    }

    debug!("Input thread finished");
}
