use crate::error::ConfigError;
use crate::result::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "marble.config.json";

/// Marble configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub builder: BuilderConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served at `/uploads` by the file backend
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,

    /// Seconds an admin session is trusted before the auth service is asked again
    #[serde(default = "default_session_check_secs")]
    pub session_check_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
    Supabase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Hosted project URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Hosted project key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_table")]
    pub table: String,

    /// Accounts the memory and file backends accept at startup
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admins: Vec<AdminAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderConfig {
    /// Slug of the page the builder edits
    #[serde(default = "default_slug")]
    pub slug: String,

    #[serde(default = "default_title")]
    pub title: String,

    /// Pointer travel in px before a press becomes a drag
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,

    /// Strip active content from text markup
    #[serde(default = "default_true")]
    pub sanitize_markup: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_session_check_secs() -> u64 {
    60
}

fn default_data_dir() -> String {
    ".marble".to_string()
}

fn default_bucket() -> String {
    "images".to_string()
}

fn default_table() -> String {
    "pages".to_string()
}

fn default_slug() -> String {
    "home".to_string()
}

fn default_title() -> String {
    "Home".to_string()
}

fn default_drag_threshold() -> f64 {
    8.0
}

fn default_true() -> bool {
    true
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            uploads_dir: default_uploads_dir(),
            session_check_secs: default_session_check_secs(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            url: None,
            key: None,
            data_dir: default_data_dir(),
            bucket: default_bucket(),
            table: default_table(),
            admins: Vec::new(),
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            slug: default_slug(),
            title: default_title(),
            drag_threshold: default_drag_threshold(),
            sanitize_markup: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Config {
    /// Load config from a directory, then apply environment overrides
    pub fn load(cwd: impl AsRef<Path>) -> ConfigResult<Self> {
        let mut config = Self::load_file(cwd)?;
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Load the config file alone; a missing file yields the defaults
    pub fn load_file(cwd: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_path = Self::path_in(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn path_in(cwd: impl AsRef<Path>) -> PathBuf {
        cwd.as_ref().join(DEFAULT_CONFIG_NAME)
    }

    /// Apply `MARBLE_*` overrides from `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(url) = lookup("MARBLE_BACKEND_URL") {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup("MARBLE_BACKEND_KEY") {
            self.backend.key = Some(key);
        }
        if let Some(host) = lookup("MARBLE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MARBLE_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "MARBLE_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    /// Write this config as pretty JSON, refusing to overwrite unless `force`
    pub fn write(&self, cwd: impl AsRef<Path>, force: bool) -> ConfigResult<PathBuf> {
        let path = Self::path_in(cwd);
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.display().to_string()));
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
