//! The user's access token and language, loaded once and persisted on change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::Result;

use super::store::PreferenceStore;

/// Interface language. Norwegian is the default.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    No,
    En,
}

/// On-disk shape. The language is kept as a raw string so an unknown value
/// falls back to the default instead of failing the whole load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// User preferences bound to a store.
///
/// Loaded with [`Preferences::load`] at startup and passed explicitly to
/// whatever needs them. Every setter writes through to the store before
/// returning.
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    access_token: Option<String>,
    language: Language,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("access_token", &self.access_token.as_ref().map(|_| ".."))
            .field("language", &self.language)
            .finish()
    }
}

impl Preferences {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Result<Self> {
        let stored = store.load()?.unwrap_or_default();
        let language = stored
            .language
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let access_token = stored.access_token.filter(|t| !t.trim().is_empty());
        debug!(%language, has_token = access_token.is_some(), "preferences loaded");
        Ok(Self {
            store,
            access_token,
            language,
        })
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Store a new token. Returns `false` and changes nothing if it is blank.
    pub fn set_token(&mut self, token: &str) -> Result<bool> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }
        self.access_token = Some(token.to_string());
        self.persist()?;
        Ok(true)
    }

    pub fn clear_token(&mut self) -> Result<()> {
        self.access_token = None;
        self.persist()
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.language = language;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&StoredPreferences {
            access_token: self.access_token.clone(),
            language: Some(self.language.to_string()),
        })
    }
}
