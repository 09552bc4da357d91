//! Configuration loading and defaults for langsmith-mcp.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://api.smith.langchain.com";

// === Types ===

/// Resolved server configuration, including defaults and environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub workspace_id: Option<String>,
    /// Request timeout in seconds for vendor API calls.
    pub request_timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(flatten)]
    base: Config,
    profiles: Option<HashMap<String, Config>>,
}

// === Config Loading ===

impl Config {
    /// Load configuration from disk and merge with environment overrides.
    pub fn load(path: Option<PathBuf>, profile: Option<&str>) -> Result<Self> {
        let path = path.or_else(default_config_path);
        let mut config = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                let parsed: ConfigFile = toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
                apply_profile(parsed, profile)?
            }
            _ => Config::default(),
        };

        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Validate that config fields are usable.
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.api_key
            && key.trim().is_empty()
        {
            anyhow::bail!("api_key cannot be an empty string");
        }
        if let Some(endpoint) = self.endpoint.as_deref() {
            let trimmed = endpoint.trim();
            if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
                anyhow::bail!("Invalid endpoint '{endpoint}': expected an http(s) URL");
            }
        }
        if let Some(workspace_id) = self.workspace_id.as_deref()
            && uuid::Uuid::parse_str(workspace_id.trim()).is_err()
        {
            anyhow::bail!("Invalid workspace_id '{workspace_id}': expected a UUID");
        }
        Ok(())
    }

    /// The API key, required for every vendor call.
    pub fn api_key(&self) -> Result<String> {
        self.api_key
            .as_deref()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .context(
                "LangSmith API key not found. Set LANGSMITH_API_KEY or add api_key to the config file.",
            )
    }

    /// Base API URL, trailing slash stripped.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint
            .as_deref()
            .map(|e| e.trim().trim_end_matches('/').to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    #[must_use]
    pub fn workspace_id(&self) -> Option<String> {
        self.workspace_id
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
    }

    #[must_use]
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout.unwrap_or(30)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("langsmith-mcp").join("config.toml"))
}

fn apply_profile(parsed: ConfigFile, profile: Option<&str>) -> Result<Config> {
    let Some(name) = profile else {
        return Ok(parsed.base);
    };
    let profiles = parsed.profiles.unwrap_or_default();
    let overlay = profiles
        .get(name)
        .with_context(|| format!("Unknown config profile: {name}"))?;

    let mut merged = parsed.base;
    if overlay.api_key.is_some() {
        merged.api_key = overlay.api_key.clone();
    }
    if overlay.endpoint.is_some() {
        merged.endpoint = overlay.endpoint.clone();
    }
    if overlay.workspace_id.is_some() {
        merged.workspace_id = overlay.workspace_id.clone();
    }
    if overlay.request_timeout.is_some() {
        merged.request_timeout = overlay.request_timeout;
    }
    Ok(merged)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("LANGSMITH_API_KEY")
        && !key.trim().is_empty()
    {
        config.api_key = Some(key);
    }
    if let Ok(endpoint) = std::env::var("LANGSMITH_ENDPOINT")
        && !endpoint.trim().is_empty()
    {
        config.endpoint = Some(endpoint);
    }
    if let Ok(workspace) = std::env::var("LANGSMITH_WORKSPACE_ID")
        && !workspace.trim().is_empty()
    {
        config.workspace_id = Some(workspace);
    }
}
