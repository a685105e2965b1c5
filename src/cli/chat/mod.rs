pub mod command;
pub mod controller;
pub mod conversation_state;
pub mod persona;
pub mod prompt;
pub mod render;

use std::io::Write;
use std::process::ExitCode;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;

use color_print::cstr;
use command::Command;
use controller::{Controller, Outcome};
use crossterm::style::Stylize;
use eyre::{eyre, Result};
use prompt::{generate_prompt, InputEvent, PromptState};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::gemini_client::TextGenerator;

const WELCOME_TEXT: &str = cstr!(
    "
<bold>Namaste! Guruji is listening.</> Ask about love, career, marriage, anything.

/help         Show the help dialogue
/quit         Quit the application
"
);

const HELP_TEXT: &str = cstr!(
    "
<bold>AstroJoke</>

/theme        Switch between light and dark mode
/emoji        Show or hide the emoji bar
/emoji N      Add the N-th emoji to your message
/help         Show this help dialogue
/quit         Quit the application

Only one question can be asked at a time. Anything you send while Guruji is
typing is ignored.
"
);

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    controller: Controller,
    generator: Arc<dyn TextGenerator>,
    show_emoji_bar: bool,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        controller: Controller,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            controller,
            generator,
            show_emoji_bar: false,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Non-interactive mode (single question)
        if let Some(input) = self.input.take() {
            return self.run_once(&input).await;
        }

        if self.interactive {
            self.print_welcome()?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        render::render_header(self.output.as_mut(), self.controller.theme())?;
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_once(&mut self, input: &str) -> Result<ExitCode> {
        if !self.controller.round_trip(input, self.generator.as_ref()).await {
            writeln!(self.output, "Nothing to ask.")?;
            return Ok(ExitCode::FAILURE);
        }
        render::render_all(
            self.output.as_mut(),
            self.controller.messages(),
            self.controller.theme(),
        )?;
        Ok(ExitCode::SUCCESS)
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<InputEvent>();
        let (prompt_tx, prompt_rx) = std_mpsc::channel::<PromptState>();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();

        let input_thread = thread::Builder::new()
            .name("line-editor".to_string())
            .spawn(move || prompt::read_lines(prompt_rx, event_tx))?;

        prompt_tx
            .send(self.prompt_state())
            .map_err(|_| eyre!("input thread stopped before the first prompt"))?;

        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    match event {
                        InputEvent::Line(line) => {
                            if !self.handle_line(&line, &outcome_tx)? {
                                break;
                            }
                        }
                        InputEvent::Eof => break,
                        InputEvent::Error(e) => {
                            writeln!(self.output, "Error: {}", e)?;
                            break;
                        }
                    }
                    if prompt_tx.send(self.prompt_state()).is_err() {
                        break;
                    }
                }
                Some(outcome) = outcome_rx.recv() => {
                    self.show_outcome(outcome)?;
                }
                else => break,
            }
        }

        // Unblocks the input thread if it is waiting for the next prompt.
        drop(prompt_tx);
        if input_thread.join().is_err() {
            error!("Input thread panicked");
        }

        Ok(())
    }

    fn prompt_state(&self) -> PromptState {
        PromptState {
            prompt: generate_prompt(self.controller.is_pending()),
            compose: self.controller.compose().to_string(),
        }
    }

    /// Returns `false` when the session should end.
    fn handle_line(&mut self, line: &str, outcomes: &mpsc::UnboundedSender<Outcome>) -> Result<bool> {
        let theme = self.controller.theme();

        match Command::parse_after_compose(self.controller.compose(), line) {
            Some(Command::Quit) => return Ok(false),
            Some(Command::Help) => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            Some(Command::ToggleTheme) => {
                let theme = self.controller.toggle_theme();
                render::render_theme_change(self.output.as_mut(), theme)?;
            }
            Some(Command::ToggleEmojiBar) => {
                self.show_emoji_bar = !self.show_emoji_bar;
                if self.show_emoji_bar {
                    render::render_emoji_bar(self.output.as_mut(), theme)?;
                }
            }
            Some(Command::InsertEmoji(n)) => match persona::emoji(n) {
                Some(symbol) => self.controller.insert_emoji(symbol),
                None => {
                    writeln!(self.output, "Pick a number between 1 and {}.", persona::EMOJIS.len())?;
                }
            },
            None => {
                self.controller.set_compose(line);
                self.send(outcomes)?;
            }
        }

        Ok(true)
    }

    fn send(&mut self, outcomes: &mpsc::UnboundedSender<Outcome>) -> Result<()> {
        let Some(request) = self.controller.submit_compose() else {
            return Ok(());
        };

        let theme = self.controller.theme();
        if let Some(message) = self.controller.messages().last() {
            render::render_message(self.output.as_mut(), message, theme)?;
        }
        render::render_typing(self.output.as_mut(), theme)?;

        let generator = Arc::clone(&self.generator);
        let outcomes = outcomes.clone();
        tokio::spawn(async move {
            let outcome = Outcome::from(generator.generate(&request).await);
            if outcomes.send(outcome).is_err() {
                debug!("Chat loop closed before the response arrived");
            }
        });

        Ok(())
    }

    fn show_outcome(&mut self, outcome: Outcome) -> Result<()> {
        let theme = self.controller.theme();
        if let Some(message) = self.controller.on_response(outcome) {
            // The line editor still owns the current line; start below it so
            // whatever the user has typed stays on screen.
            writeln!(self.output)?;
            render::render_message(self.output.as_mut(), message, theme)?;
            writeln!(self.output, "{}", "Press Enter to continue.".italic())?;
            self.output.flush()?;
        }
        Ok(())
    }
}
