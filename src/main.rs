mod cli;
mod config;
mod gemini_client;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::controller::Controller;
use crate::cli::chat::conversation_state::Theme;
use crate::cli::chat::ChatContext;
use crate::config::Config;
use crate::gemini_client::GeminiClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ask a single question and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Gemini model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting AstroJoke");

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    let client = match GeminiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to initialize Gemini client: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Using model {}", client.model());

    let theme = if cli.dark || config.dark_mode {
        Theme::Dark
    } else {
        Theme::Light
    };

    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        cli.input,
        true,
        Controller::new(theme),
        Arc::new(client),
    );
    chat_context.run().await
}
