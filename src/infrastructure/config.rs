use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::domain::DomainError;
use crate::infrastructure::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const CONFIG_DIR_ENV: &str = "CONFIG_DIR";
const CONFIG_FILE: &str = "config.yaml";
const PROMPTS_FILE: &str = "prompts.yaml";

/// Runtime settings plus prompt texts, each loaded from its own YAML file.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Loads `config.yaml` and `prompts.yaml` from `CONFIG_DIR` (default `./config`),
    /// falling back to defaults for missing files, then applies env overrides.
    pub fn load() -> Result<Self, DomainError> {
        let dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));
        let mut app = Self::from_dir(&dir)?;
        app.config.apply_env();
        Ok(app)
    }

    pub fn from_dir(dir: &Path) -> Result<Self, DomainError> {
        Ok(Self {
            config: read_yaml(&dir.join(CONFIG_FILE))?.unwrap_or_default(),
            prompts: read_yaml(&dir.join(PROMPTS_FILE))?.unwrap_or_default(),
        })
    }
}

fn read_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, DomainError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DomainError::internal(format!("reading {}: {e}", path.display())))?;
    serde_yaml::from_str(&raw)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("parsing {}: {e}", path.display())))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub loader: LoaderConfig,
    pub llm: LlmConfig,
    pub cors: CorsConfig,
}

impl Config {
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.llm.model = model;
        }
        if let Ok(key) = std::env::var("API_KEY") {
            self.server.api_key = Some(key);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When set, `/api/v1` requires a matching `X-API-Key` header.
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// True when `/api/v1` is reachable beyond loopback without an API key.
    /// `/api/v1/chunks` fetches caller-supplied URLs, so such a deployment
    /// relays requests for anyone who can reach it.
    pub fn is_exposed_without_key(&self) -> bool {
        if self.api_key.is_some() {
            return false;
        }
        match self.host.parse::<IpAddr>() {
            Ok(ip) => !ip.is_loopback(),
            Err(_) => self.host != "localhost",
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub user_agent: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 0,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub chat: ChatPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub system: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: "Answer the user's question using the supporting context when it is relevant."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.loader.chunk_size, 2000);
        assert_eq!(config.loader.chunk_overlap, 0);
        assert_eq!(config.llm.model, "gemini-1.0-pro");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            "loader:\n  chunk_size: 500\n  chunk_overlap: 50\nllm:\n  temperature: 0.5\n",
        )
        .unwrap();

        assert_eq!(config.loader.chunk_size, 500);
        assert_eq!(config.loader.chunk_overlap, 50);
        assert_eq!(config.llm.temperature, Some(0.5));
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_exposure_without_key() {
        let mut server = ServerConfig::default();
        assert!(server.is_exposed_without_key());

        server.host = "127.0.0.1".to_string();
        assert!(!server.is_exposed_without_key());
        server.host = "localhost".to_string();
        assert!(!server.is_exposed_without_key());

        server.host = "0.0.0.0".to_string();
        server.api_key = Some("secret".to_string());
        assert!(!server.is_exposed_without_key());
    }

    #[test]
    fn test_missing_dir_uses_defaults() {
        let app = AppConfig::from_dir(Path::new("does/not/exist")).unwrap();
        assert_eq!(app.config.loader.chunk_size, 2000);
        assert!(!app.prompts.chat.system.is_empty());
    }

    #[test]
    fn test_shipped_config_parses() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
        let app = AppConfig::from_dir(&dir).unwrap();
        assert_eq!(app.config.llm.model, DEFAULT_MODEL);
        assert!(!app.prompts.chat.system.is_empty());
    }
}
