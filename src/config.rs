// Configuration: everything is read from environment variables (a `.env`
// file is loaded by `main` beforehand). There is no config file.

use reqwest::Url;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GISTIFY_API_URL '{url}' is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("GISTIFY_API_URL '{url}' must use http or https")]
    UnsupportedScheme { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the summarization service, without trailing slash.
    pub base_url: String,
    /// Directory downloaded summaries are written to.
    pub download_dir: PathBuf,
    /// Program invoked to read a summary aloud.
    pub speech_program: String,
    /// Whether output may contain ANSI colors.
    pub color: bool,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("GISTIFY_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let base_url = validate_base_url(raw_url.trim())?;

        let download_dir = lookup("GISTIFY_DOWNLOAD_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let speech_program = lookup("GISTIFY_SPEECH_PROGRAM")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default_speech_program().into());

        // https://no-color.org: any non-empty value disables color.
        let color = lookup("NO_COLOR").map_or(true, |v| v.is_empty());

        Ok(Config {
            base_url,
            download_dir,
            speech_program,
            color,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            url: raw.to_string(),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn default_speech_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}
