// Runtime settings. Everything has a default; environment variables only
// exist so the tool can be pointed at another API or config directory.

use std::env;
use std::path::PathBuf;

pub const APP_NAME: &str = "pronto";
pub const DEFAULT_API_URL: &str = "https://api.compose.io/2016-07";
pub const DEFAULT_TOKEN_URL: &str = "https://app.compose.io/oauth/api_tokens";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Versioned API base, without trailing slash.
    pub api_url: String,
    /// Page where users create an API token.
    pub token_url: String,
    /// Directory holding `pronto.json`.
    pub config_dir: PathBuf,
    /// Where the certificate is written.
    pub out_dir: PathBuf,
}

impl Settings {
    /// Read `PRONTO_API_URL`, `PRONTO_TOKEN_URL` and `PRONTO_CONFIG_DIR`,
    /// falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("PRONTO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let token_url = non_empty("PRONTO_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.into());
        let config_dir = non_empty("PRONTO_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_config_dir);

        Settings {
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url,
            config_dir,
            out_dir: PathBuf::from("."),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("configstore")
}
