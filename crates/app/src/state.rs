use std::net::SocketAddr;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use common::chain::CommunityAddress;
use common::crypto::SecretKey;

pub const APP_NAME: &str = "station";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KEY_FILE_NAME: &str = "key.pem";
pub const COMMUNITY_FILE_NAME: &str = "community.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listen address for the API server
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Base URL of the voucher upload service
    #[serde(default)]
    pub voucher_base_url: Option<String>,
    /// Path prefixes the envelope middleware leaves alone
    #[serde(default = "default_exempt_prefixes")]
    pub exempt_path_prefixes: Vec<String>,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Write rolling log files here in addition to stdout
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_exempt_prefixes() -> Vec<String> {
    vec!["/_status".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            voucher_base_url: None,
            exempt_path_prefixes: default_exempt_prefixes(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the station directory (~/.station)
    pub station_dir: PathBuf,
    /// Path to the secret key PEM file
    pub key_path: PathBuf,
    /// Path to the community address book
    pub community_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the station directory path (custom or default ~/.station)
    pub fn station_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new station state directory
    ///
    /// Generates a fresh secret key, writes the config, and copies in the
    /// community address book if one was given.
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
        community_src: Option<PathBuf>,
    ) -> Result<Self, StateError> {
        let station_dir = Self::station_dir(custom_path)?;

        if station_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&station_dir)?;

        let key = SecretKey::generate();
        let key_path = station_dir.join(KEY_FILE_NAME);
        fs::write(&key_path, key.to_pem())?;

        let config = config.unwrap_or_default();
        let config_path = station_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        let community_path = station_dir.join(COMMUNITY_FILE_NAME);
        if let Some(src) = community_src {
            // validate before copying; a bad address book should fail init,
            // not the first serve
            CommunityAddress::load(&src).map_err(|e| StateError::InvalidCommunity(e.to_string()))?;
            fs::copy(&src, &community_path)?;
        }

        Ok(Self {
            station_dir,
            key_path,
            community_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the station directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let station_dir = Self::station_dir(custom_path)?;

        if !station_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let key_path = station_dir.join(KEY_FILE_NAME);
        let community_path = station_dir.join(COMMUNITY_FILE_NAME);
        let config_path = station_dir.join(CONFIG_FILE_NAME);

        if !key_path.exists() {
            return Err(StateError::MissingFile(KEY_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            station_dir,
            key_path,
            community_path,
            config_path,
            config,
        })
    }

    /// Load the secret key from the key file
    pub fn load_key(&self) -> Result<SecretKey, StateError> {
        let pem = fs::read_to_string(&self.key_path)?;
        let key = SecretKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))?;
        Ok(key)
    }

    /// Load the community address book
    pub fn load_community(&self) -> Result<CommunityAddress, StateError> {
        if !self.community_path.exists() {
            return Err(StateError::MissingFile(COMMUNITY_FILE_NAME.to_string()));
        }
        CommunityAddress::load(&self.community_path)
            .map_err(|e| StateError::InvalidCommunity(e.to_string()))
    }

    /// Assemble the service configuration from this state
    pub fn service_config(&self) -> Result<service::Config, StateError> {
        let secret_key = self.load_key()?;
        let community = self.load_community()?;

        let mut config = service::Config::new(secret_key, community);
        config.listen_addr = self
            .config
            .listen_addr
            .parse::<SocketAddr>()
            .map_err(|_| StateError::InvalidListenAddr(self.config.listen_addr.clone()))?;
        config.voucher_base_url = self
            .config
            .voucher_base_url
            .as_deref()
            .map(url::Url::parse)
            .transpose()
            .map_err(|e| StateError::InvalidCommunity(e.to_string()))?;
        config.exempt_path_prefixes = self.config.exempt_path_prefixes.clone();
        config.log_level = self
            .config
            .log_level
            .parse()
            .map_err(|_| StateError::InvalidLogLevel(self.config.log_level.clone()))?;
        config.log_dir = self.config.log_dir.clone();

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("station directory not initialized. Run 'station init' first")]
    NotInitialized,

    #[error("station directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid community address book: {0}")]
    InvalidCommunity(String),

    #[error("invalid listen address: {0}")]
    InvalidListenAddr(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
