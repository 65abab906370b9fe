//! Configuration loading and root folder resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal: the service starts on defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "newsroom.db";

/// Default vector-search assistant name
pub const DEFAULT_ASSISTANT_NAME: &str = "news";

/// Default session lifetime in hours
pub const DEFAULT_SESSION_HOURS: i64 = 24;

pub const ENV_ROOT_FOLDER: &str = "NEWSROOM_ROOT_FOLDER";
pub const ENV_HOST: &str = "NEWSROOM_HOST";
pub const ENV_PORT: &str = "NEWSROOM_PORT";
pub const ENV_WEB_SEARCH: &str = "NEWSROOM_WEB_SEARCH";
pub const ENV_SESSION_HOURS: &str = "NEWSROOM_SESSION_HOURS";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_PINECONE_API_KEY: &str = "PINECONE_API_KEY";
pub const ENV_ASSISTANT_NAME: &str = "ASSISTANT_NAME";

/// Logging section of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of `newsroom.toml`; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub groq_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub pinecone_api_key: Option<String>,
    pub assistant_name: Option<String>,
    pub web_search: Option<bool>,
    pub session_hours: Option<i64>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct NewsroomConfig {
    /// Data directory holding the database and uploaded media
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Language-model key; classification is skipped when absent
    pub groq_api_key: Option<String>,
    /// News API key; news corroboration is skipped when absent
    pub news_api_key: Option<String>,
    /// Vector-search assistant key; `/chat` answers 503 when absent
    pub pinecone_api_key: Option<String>,
    pub assistant_name: String,
    pub web_search_enabled: bool,
    pub session_hours: i64,
}

impl NewsroomConfig {
    /// Configuration rooted at `root_folder` with every integration disabled
    pub fn with_root(root_folder: impl Into<PathBuf>) -> Self {
        Self {
            root_folder: root_folder.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
            groq_api_key: None,
            news_api_key: None,
            pinecone_api_key: None,
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            web_search_enabled: false,
            session_hours: DEFAULT_SESSION_HOURS,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    /// Directory that holds `images/` and `videos/`
    pub fn upload_root(&self) -> PathBuf {
        self.root_folder.join("static")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Candidate TOML locations, user config first
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("newsroom").join("newsroom.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/newsroom/newsroom.toml"));
    }
    paths
}

/// Load the TOML config file
///
/// With an explicit path the file must exist and parse. Without one, the
/// first existing default location is used, or defaults when none exists.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        return read_toml(path);
    }

    for path in default_config_paths() {
        if path.exists() {
            return read_toml(&path);
        }
    }

    warn!("No newsroom.toml found, using defaults");
    Ok(TomlConfig::default())
}

fn read_toml(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("newsroom"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/newsroom"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("newsroom"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/newsroom"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("newsroom"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\newsroom"))
    } else {
        PathBuf::from("./newsroom_data")
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_value(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, raw))),
        None => Ok(None),
    }
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    match env_value(name) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::Config(format!("{} must be true or false, got {}", name, raw))),
        },
        None => Ok(None),
    }
}

/// First valid key among environment and TOML, logging where it came from
fn resolve_key(label: &str, env_name: &str, toml_key: Option<&String>) -> Option<String> {
    if let Some(key) = env_value(env_name).filter(|k| is_valid_key(k)) {
        info!("{} loaded from environment variable", label);
        return Some(key);
    }
    if let Some(key) = toml_key.filter(|k| is_valid_key(k)) {
        info!("{} loaded from TOML config", label);
        return Some(key.clone());
    }
    warn!("{} not configured", label);
    None
}

/// Resolve the service configuration from all tiers
pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<NewsroomConfig> {
    let root_folder = cli
        .root_folder
        .clone()
        .or_else(|| env_value(ENV_ROOT_FOLDER).map(PathBuf::from))
        .or_else(|| toml.root_folder.clone())
        .unwrap_or_else(get_default_root_folder);

    let host = cli
        .host
        .clone()
        .or_else(|| env_value(ENV_HOST))
        .or_else(|| toml.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match cli.port {
        Some(port) => port,
        None => env_parsed::<u16>(ENV_PORT)?
            .or(toml.port)
            .unwrap_or(DEFAULT_PORT),
    };

    let web_search_enabled = env_flag(ENV_WEB_SEARCH)?
        .or(toml.web_search)
        .unwrap_or(true);

    let session_hours = env_parsed::<i64>(ENV_SESSION_HOURS)?
        .or(toml.session_hours)
        .unwrap_or(DEFAULT_SESSION_HOURS);
    if session_hours <= 0 {
        return Err(Error::Config(format!(
            "session lifetime must be positive, got {} hours",
            session_hours
        )));
    }

    let assistant_name = env_value(ENV_ASSISTANT_NAME)
        .or_else(|| toml.assistant_name.clone())
        .unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string());

    Ok(NewsroomConfig {
        root_folder,
        host,
        port,
        log_level: toml.logging.level.clone(),
        groq_api_key: resolve_key("Groq API key", ENV_GROQ_API_KEY, toml.groq_api_key.as_ref()),
        news_api_key: resolve_key("News API key", ENV_NEWS_API_KEY, toml.news_api_key.as_ref()),
        pinecone_api_key: resolve_key(
            "Pinecone API key",
            ENV_PINECONE_API_KEY,
            toml.pinecone_api_key.as_ref(),
        ),
        assistant_name,
        web_search_enabled,
        session_hours,
    })
}
