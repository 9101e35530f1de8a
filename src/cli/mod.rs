//! Command-line front end.

pub mod chat;
pub mod preferences;

use clap::{Parser, Subcommand};

use crate::config::Language;
use crate::types::Source;

/// Kulturarv Chat CLI
#[derive(Parser, Debug)]
#[command(
    name = "kulturarv",
    version,
    about = "Explore Norwegian cultural heritage with AI"
)]
pub struct Cli {
    /// Override the service URL (defaults to KULTURARV_BASE_URL or production)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save an access token
    Login(LoginArgs),
    /// Forget the saved access token
    Logout,
    /// Show service availability and local settings
    Status,
    /// Set the interface language
    Language(LanguageArgs),
    /// Ask a question
    Chat(ChatArgs),
}

/// Arguments for `kulturarv login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Access token issued by the administrator
    pub token: String,
}

/// Arguments for `kulturarv language`.
#[derive(Parser, Debug)]
pub struct LanguageArgs {
    /// `no` or `en`
    pub language: Language,
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Sources to consult (repeatable; defaults to all)
    #[arg(short, long = "source")]
    pub sources: Vec<Source>,

    /// Use the non-streaming endpoint
    #[arg(long)]
    pub no_stream: bool,

    /// Cancel the reply after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Token to use instead of the saved one
    #[arg(long)]
    pub token: Option<String>,

    /// Question (positional)
    pub prompt: String,
}
