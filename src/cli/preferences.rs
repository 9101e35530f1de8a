//! Handlers for `login`, `logout`, `language` and `status`.

use std::sync::Arc;

use crate::client::ChatClient;
use crate::config::{FileStore, Language, Preferences};
use crate::types::Source;

pub fn load_preferences() -> crate::error::Result<Preferences> {
    Preferences::load(Arc::new(FileStore::new_default()))
}

pub fn handle_login(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut prefs = load_preferences()?;
    if !prefs.set_token(token)? {
        return Err("access token must not be empty".into());
    }
    match prefs.language() {
        Language::No => println!("✅ Tilgangstoken lagret"),
        Language::En => println!("✅ Access token saved"),
    }
    Ok(())
}

pub fn handle_logout() -> Result<(), Box<dyn std::error::Error>> {
    let mut prefs = load_preferences()?;
    prefs.clear_token()?;
    match prefs.language() {
        Language::No => println!("Logget ut"),
        Language::En => println!("Logged out"),
    }
    Ok(())
}

pub fn handle_language(language: Language) -> Result<(), Box<dyn std::error::Error>> {
    let mut prefs = load_preferences()?;
    prefs.set_language(language)?;
    println!("language = {language}");
    Ok(())
}

pub async fn handle_status(client: &ChatClient) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = load_preferences()?;
    println!("Service:   {}", client.config().base_url);
    println!(
        "Token:     {}",
        if prefs.access_token().is_some() {
            "saved"
        } else {
            "not set"
        }
    );
    println!("Language:  {}", prefs.language());

    let status = client.check_status().await?;
    println!("Enabled:   {}", status.enabled);
    println!("Rate limit: {}/hour", status.rate_limit_per_hour);
    println!(
        "Streaming: {}",
        status
            .streaming_supported
            .map_or("unknown".to_string(), |s| s.to_string())
    );
    for name in &status.sources_available {
        let label = name
            .parse::<Source>()
            .map(|s| format!("{} ({})", s.info().name, s.info().description))
            .unwrap_or_else(|_| name.clone());
        println!("  • {label}");
    }
    Ok(())
}
