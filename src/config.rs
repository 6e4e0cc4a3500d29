use std::path::PathBuf;

use crate::deck::DEFAULT_STYLE;

pub const DEFAULT_DECK_API_URL: &str = "https://aran-api-backend.vercel.app/api/generate-deck";
pub const DEFAULT_IMAGE_API_URL: &str = "https://aran-api-backend.vercel.app/api/generate-images";
pub const DEFAULT_APP_URL: &str = "https://aran-deck.vercel.app/";
pub const DEFAULT_DATA_DIR: &str = "./deckforge-data";
pub const DEFAULT_PRINT_COMMAND: &str = "lp";

/// Runtime configuration, read from the environment (after `.env` is
/// loaded) with defaults for everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Deck generation endpoint.
    pub deck_api_url: String,
    /// Image generation endpoint.
    pub image_api_url: String,
    /// Application URL share links are built on.
    pub app_url: String,
    /// Directory backing the key/value store.
    pub data_dir: PathBuf,
    /// Style used when none is chosen.
    pub default_style: String,
    /// Host print command used by `export --print`.
    pub print_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deck_api_url: DEFAULT_DECK_API_URL.to_string(),
            image_api_url: DEFAULT_IMAGE_API_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_style: DEFAULT_STYLE.to_string(),
            print_command: DEFAULT_PRINT_COMMAND.to_string(),
        }
    }
}

impl Config {
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `DECK_API_URL`            | hosted generate-deck API |
    /// | `IMAGE_API_URL`           | hosted generate-images API |
    /// | `DECKFORGE_APP_URL`       | hosted app URL           |
    /// | `DECKFORGE_DATA_DIR`      | `./deckforge-data`       |
    /// | `DECKFORGE_STYLE`         | `Film / Narrative`       |
    /// | `DECKFORGE_PRINT_COMMAND` | `lp`                     |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            deck_api_url: var("DECK_API_URL").unwrap_or(defaults.deck_api_url),
            image_api_url: var("IMAGE_API_URL").unwrap_or(defaults.image_api_url),
            app_url: var("DECKFORGE_APP_URL").unwrap_or(defaults.app_url),
            data_dir: var("DECKFORGE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            default_style: var("DECKFORGE_STYLE").unwrap_or(defaults.default_style),
            print_command: var("DECKFORGE_PRINT_COMMAND").unwrap_or(defaults.print_command),
        }
    }
}
