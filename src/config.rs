use std::env;
use std::path::PathBuf;

use crate::api_connection::endpoints::{DEFAULT_MODEL, OPENROUTER_CHAT_URL};

pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const ENDPOINT_ENV_VAR: &str = "RECIPE_BOT_ENDPOINT";
pub const MODEL_ENV_VAR: &str = "RECIPE_BOT_MODEL";
pub const HISTORY_ENV_VAR: &str = "RECIPE_BOT_HISTORY";
pub const SITE_URL_ENV_VAR: &str = "SITE_URL";
pub const APP_NAME_ENV_VAR: &str = "APP_NAME";

pub const DEFAULT_HISTORY_FILE: &str = "history.csv";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_NAME: &str = "OpenRecipeBot";

/// Settings resolved once at startup and handed to the components that need them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub history_file: PathBuf,
    pub site_url: String,
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: OPENROUTER_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            site_url: DEFAULT_SITE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source; missing or blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            api_key: non_blank(API_KEY_ENV_VAR),
            endpoint: non_blank(ENDPOINT_ENV_VAR).unwrap_or(defaults.endpoint),
            model: non_blank(MODEL_ENV_VAR).unwrap_or(defaults.model),
            history_file: non_blank(HISTORY_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
            site_url: non_blank(SITE_URL_ENV_VAR).unwrap_or(defaults.site_url),
            app_name: non_blank(APP_NAME_ENV_VAR).unwrap_or(defaults.app_name),
        }
    }

    pub fn with_history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_file = path.into();
        self
    }
}
