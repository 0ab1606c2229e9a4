//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::app::cache::CacheConfig;

pub const DEFAULT_NATIVE_PORT: u16 = 9000;
pub const DEFAULT_HTTP_PORT: u16 = 8123;
pub const DEFAULT_SERVER_ADDR: &str = ":8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to read TLS material {path}: {source}")]
    TlsMaterial {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Native,
    Http,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    pub enabled: bool,
    pub skip_verify: bool,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
    pub ca_path: Option<PathBuf>,
    pub server_name: Option<String>,
}

/// PEM bytes read from the configured TLS paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsMaterial {
    pub ca: Option<Vec<u8>>,
    /// Client certificate followed by its private key.
    pub identity: Option<Vec<u8>>,
}

impl TlsSettings {
    pub fn has_client_certificate(&self) -> bool {
        self.cert_path.is_some() && self.key_path.is_some()
    }

    pub fn read_material(&self) -> Result<TlsMaterial, ConfigError> {
        let ca = self.ca_path.as_deref().map(read_pem).transpose()?;
        let identity = match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => {
                let mut pem = read_pem(cert)?;
                pem.push(b'\n');
                pem.extend(read_pem(key)?);
                Some(pem)
            }
            _ => None,
        };
        Ok(TlsMaterial { ca, identity })
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ConfigError> {
    fs::read(path).map_err(|source| ConfigError::TlsMaterial {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickHouseSettings {
    pub host: String,
    /// Falls back to the transport's default port when unset.
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
    pub transport: Transport,
    pub tls: TlsSettings,
}

impl Default for ClickHouseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            user: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
            transport: Transport::default(),
            tls: TlsSettings::default(),
        }
    }
}

impl ClickHouseSettings {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(match self.transport {
            Transport::Native => DEFAULT_NATIVE_PORT,
            Transport::Http => DEFAULT_HTTP_PORT,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl ServerSettings {
    /// A bare `:port` listens on every interface.
    pub fn bind_addr(&self) -> String {
        if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub clickhouse: ClickHouseSettings,
    pub server: ServerSettings,
    pub cache: CacheConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::load`] with environment lookups going through `env`.
    pub fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(path) = path {
            settings.apply_file(FileConfig::load(path)?);
        }
        settings.apply_env(&env);
        Ok(settings)
    }

    fn apply_file(&mut self, file: FileConfig) {
        let clickhouse = file.clickhouse;
        let target = &mut self.clickhouse;
        if let Some(host) = clickhouse.host {
            target.host = host;
        }
        if clickhouse.port.is_some() {
            target.port = clickhouse.port;
        }
        if let Some(user) = clickhouse.user {
            target.user = user;
        }
        if let Some(password) = clickhouse.password {
            target.password = password;
        }
        if let Some(database) = clickhouse.database {
            target.database = database;
        }
        if let Some(transport) = clickhouse.transport {
            target.transport = transport;
        }

        let tls = clickhouse.tls;
        if let Some(enabled) = tls.enabled {
            target.tls.enabled = enabled;
        }
        if let Some(skip_verify) = tls.skip_verify {
            target.tls.skip_verify = skip_verify;
        }
        target.tls.cert_path = tls.cert_path.or(target.tls.cert_path.take());
        target.tls.key_path = tls.key_path.or(target.tls.key_path.take());
        target.tls.ca_path = tls.ca_path.or(target.tls.ca_path.take());
        target.tls.server_name = tls.server_name.or(target.tls.server_name.take());

        if let Some(addr) = file.server.addr {
            self.server.addr = addr;
        }

        if let Some(secs) = file.cache.ttl_secs {
            self.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = file.cache.refresh_timeout_secs {
            self.cache.refresh_timeout = Duration::from_secs(secs);
        }
        if let Some(denylist) = file.cache.denylist {
            self.cache.denylist = denylist;
        }
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) {
        let var = |key: &str| env(key).filter(|value| !value.is_empty());
        let target = &mut self.clickhouse;

        if let Some(host) = var("CLICKHOUSE_HOST") {
            target.host = host;
        }
        if let Some(port) = parsed(&var, "CLICKHOUSE_PORT") {
            target.port = Some(port);
        }
        if let Some(user) = var("CLICKHOUSE_USER") {
            target.user = user;
        }
        if let Some(password) = var("CLICKHOUSE_PASSWORD") {
            target.password = password;
        }
        if let Some(database) = var("CLICKHOUSE_DATABASE") {
            target.database = database;
        }
        if let Some(use_http) = flag(&var, "CLICKHOUSE_USE_HTTP") {
            target.transport = if use_http {
                Transport::Http
            } else {
                Transport::Native
            };
        }
        if let Some(secure) = flag(&var, "CLICKHOUSE_SECURE") {
            target.tls.enabled = secure;
        }
        if let Some(skip_verify) = flag(&var, "CLICKHOUSE_SKIP_VERIFY") {
            target.tls.skip_verify = skip_verify;
        }
        if let Some(path) = var("CLICKHOUSE_CERT_PATH") {
            target.tls.cert_path = Some(PathBuf::from(path));
        }
        if let Some(path) = var("CLICKHOUSE_KEY_PATH") {
            target.tls.key_path = Some(PathBuf::from(path));
        }
        if let Some(path) = var("CLICKHOUSE_CA_PATH") {
            target.tls.ca_path = Some(PathBuf::from(path));
        }
        if let Some(server_name) = var("CLICKHOUSE_SERVER_NAME") {
            target.tls.server_name = Some(server_name);
        }

        if let Some(addr) = var("SERVER_ADDR") {
            self.server.addr = addr;
        }
        if let Some(secs) = parsed::<u64>(&var, "SCHEMAFLOW_CACHE_TTL_SECS") {
            self.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed::<u64>(&var, "SCHEMAFLOW_REFRESH_TIMEOUT_SECS") {
            self.cache.refresh_timeout = Duration::from_secs(secs);
        }
    }
}

fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = var(key)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value = %value, "Ignoring unparseable setting");
            None
        }
    }
}

fn flag(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let value = var(key)?;
    let parsed = parse_bool(&value);
    if parsed.is_none() {
        warn!(key, value = %value, "Ignoring unparseable boolean setting");
    }
    parsed
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// `****` for short passwords, otherwise the first and last two characters
/// around a run of `*`.
pub fn mask_password(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    clickhouse: ClickHouseSection,
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    cache: CacheSection,
}

#[derive(Debug, Default, Deserialize)]
struct ClickHouseSection {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    transport: Option<Transport>,
    #[serde(default)]
    tls: TlsSection,
}

#[derive(Debug, Default, Deserialize)]
struct TlsSection {
    enabled: Option<bool>,
    skip_verify: Option<bool>,
    cert_path: Option<PathBuf>,
    key_path: Option<PathBuf>,
    ca_path: Option<PathBuf>,
    server_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CacheSection {
    ttl_secs: Option<u64>,
    refresh_timeout_secs: Option<u64>,
    denylist: Option<Vec<String>>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
