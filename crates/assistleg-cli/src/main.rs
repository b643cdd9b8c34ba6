use anyhow::{anyhow, Context, Result};
use bat::PrettyPrinter;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

mod commands;
mod configuration;
mod error;

use configuration::Settings;

#[derive(Parser)]
#[command(author, version, about = "Legal questions answered over indexed documents", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a single question
    Ask {
        /// Topic index to answer from
        #[arg(short, long)]
        topic: String,

        /// Conversation to record the exchange under
        #[arg(short, long)]
        session: Option<String>,

        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Start an interactive conversation
    Chat {
        #[arg(short, long)]
        topic: String,

        #[arg(short, long)]
        session: Option<String>,
    },
    /// List the topics that have an index
    Topics,
    /// Check that the language model answers
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::new().context("Failed to load configuration")?;

    match cli.command {
        Command::Ask {
            topic,
            session,
            question,
        } => {
            let session = session.unwrap_or_else(|| settings.agent.default_session.clone());
            commands::ask::run(&settings, &topic, &session, &question.join(" ")).await
        }
        Command::Chat { topic, session } => {
            let session = session.unwrap_or_else(|| settings.agent.default_session.clone());
            commands::chat::run(&settings, &topic, &session).await
        }
        Command::Topics => commands::topics::run(&settings),
        Command::Ping => commands::ping::run(&settings).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_directives = if verbose {
        "assistleg=debug,assistleg_cli=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print an answer as markdown
pub fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map_err(|e| anyhow!("Failed to render answer: {}", e))?;
    println!();
    Ok(())
}
