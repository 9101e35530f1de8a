//! Kulturarv CLI binary entry point.

use clap::Parser;
use kulturarv::cli::{chat, preferences, Cli, Commands};
use kulturarv::client::ChatClient;
use kulturarv::config::ClientConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }

    match cli.command {
        Commands::Login(args) => preferences::handle_login(&args.token),
        Commands::Logout => preferences::handle_logout(),
        Commands::Language(args) => preferences::handle_language(args.language),
        Commands::Status => preferences::handle_status(&ChatClient::new(config)?).await,
        Commands::Chat(args) => chat::handle_chat(&ChatClient::new(config)?, args).await,
    }
}
