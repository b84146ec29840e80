use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use kartei_core::domain::phone::is_valid_country_code;
use kartei_core::DEFAULT_COUNTRY_CODE;
use serde::Deserialize;
use thiserror::Error;

const DIR_NAME: &str = "kartei";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_CHUNK_SIZE: usize = 200;
pub const DEFAULT_LISTEN_PORT: u16 = 8420;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub country_code: String,
    pub server: ServerConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub chunk_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            server: ServerConfig {
                listen_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_LISTEN_PORT)),
                auth_token: None,
            },
            import: ImportConfig {
                chunk_size: DEFAULT_CHUNK_SIZE,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file is group or world accessible: {0}")]
    InsecurePermissions(PathBuf),
    #[error("country_code must be 1-3 digits, got {0:?}")]
    InvalidCountryCode(String),
    #[error("chunk_size must be positive, got {0}")]
    InvalidChunkSize(usize),
    #[error("listen_addr is not host:port, got {0:?}")]
    InvalidListenAddr(String),
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    db_path: Option<PathBuf>,
    country_code: Option<String>,
    server: Option<ServerFile>,
    import: Option<ImportFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerFile {
    listen_addr: Option<String>,
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportFile {
    chunk_size: Option<usize>,
}

/// An explicit `--config` path must exist; the default XDG location is
/// optional and quietly falls back to defaults.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let explicit = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir | ConfigError::InvalidConfigPath(_)) if !explicit => {
            return Ok(AppConfig::default())
        }
        Err(err) => return Err(err),
    };
    Ok(load_at_path(&path, explicit)?.unwrap_or_default())
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = custom {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(path));
        }
        return Ok(path);
    }

    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        Some(dir) => return Err(ConfigError::InvalidConfigPath(PathBuf::from(dir))),
        None => dirs::home_dir()
            .ok_or(ConfigError::MissingHomeDir)?
            .join(".config"),
    };
    Ok(base.join(DIR_NAME).join(CONFIG_FILE))
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return if required {
            Err(ConfigError::MissingConfigFile(path.to_path_buf()))
        } else {
            Ok(None)
        };
    }

    check_file_mode(path)?;
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    merge_file(parsed).map(Some)
}

fn merge_file(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(db_path) = parsed.db_path {
        if db_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(db_path));
        }
        config.db_path = Some(db_path);
    }
    if let Some(code) = parsed.country_code {
        if !is_valid_country_code(&code) {
            return Err(ConfigError::InvalidCountryCode(code));
        }
        config.country_code = code;
    }
    if let Some(server) = parsed.server {
        merge_server(&mut config.server, server)?;
    }
    if let Some(import) = parsed.import {
        merge_import(&mut config.import, import)?;
    }

    Ok(config)
}

fn merge_server(server: &mut ServerConfig, file: ServerFile) -> Result<()> {
    if let Some(raw) = file.listen_addr {
        server.listen_addr = raw
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr(raw))?;
    }
    if file.auth_token.is_some() {
        server.auth_token = file.auth_token;
    }
    Ok(())
}

fn merge_import(import: &mut ImportConfig, file: ImportFile) -> Result<()> {
    match file.chunk_size {
        Some(0) => Err(ConfigError::InvalidChunkSize(0)),
        Some(size) => {
            import.chunk_size = size;
            Ok(())
        }
        None => Ok(()),
    }
}

// The file can hold the API token, so group or world access fails the load.
#[cfg(unix)]
fn check_file_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.permissions().mode() & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_file_mode(_path: &Path) -> Result<()> {
    Ok(())
}
