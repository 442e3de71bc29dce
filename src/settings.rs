use crate::models::Language;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub const DEFAULT_MODEL: &str = "x-ai/grok-4.1-fast";

pub const DEFAULT_PROFILE: &str = "\
Ich arbeite Vollzeit als Softwareentwickler und habe ein geregeltes, stabiles Einkommen.
Nichtraucher, keine Haustiere, ruhiger und ordentlicher Mieter.
Ich suche ein Zuhause für ein längerfristiges Mietverhältnis.";

const KEY_PROFILE_TEXT: &str = "profile_text";
const KEY_API_KEY: &str = "openrouter_api_key";
const KEY_MODEL: &str = "model";
const KEY_LANGUAGE: &str = "language";

/// Effective user settings: stored values merged over the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub profile_text: String,
    pub openrouter_api_key: String,
    pub model: String,
    pub language: Language,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub model: Option<String>,
    pub language: Option<Language>,
    pub openrouter_api_key: Option<String>,
}

pub struct SettingsStore {
    conn: Connection,
}

impl SettingsStore {
    pub fn new(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open settings database {}", path))?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = SettingsStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now()],
        )?;
        Ok(())
    }

    /// When a key was last written, if ever.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let updated_at = self.conn
            .query_row(
                "SELECT updated_at FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated_at)
    }

    /// Stored settings over defaults. A non-empty `env_api_key` wins over the stored key.
    pub fn get_settings(&self, env_api_key: Option<&str>) -> Result<Settings> {
        let profile_text = self.get(KEY_PROFILE_TEXT)?
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let stored_key = self.get(KEY_API_KEY)?.unwrap_or_default();
        let openrouter_api_key = env_api_key
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .unwrap_or(stored_key);

        let model = self.get(KEY_MODEL)?
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let language = match self.get(KEY_LANGUAGE)? {
            Some(code) => Language::from_code(&code).unwrap_or_else(|| {
                tracing::warn!("Unknown stored language '{}', using default", code);
                Language::default()
            }),
            None => Language::default(),
        };

        Ok(Settings {
            profile_text,
            openrouter_api_key,
            model,
            language,
        })
    }

    pub fn set_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        if let Some(model) = &update.model {
            self.put(KEY_MODEL, model)?;
        }
        if let Some(language) = update.language {
            self.put(KEY_LANGUAGE, language.code())?;
        }
        if let Some(api_key) = &update.openrouter_api_key {
            self.put(KEY_API_KEY, api_key)?;
        }

        self.get_settings(None)
    }

    pub fn set_profile_text(&self, profile_text: &str) -> Result<String> {
        self.put(KEY_PROFILE_TEXT, profile_text)?;
        Ok(profile_text.to_string())
    }
}
