//! Daemon Configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `FOLIO_*`
//! environment variables (`FOLIO_AUTH__ACCESS_SECRET` -> `auth.access_secret`).

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use folio_core::application::media::DEFAULT_MAX_UPLOAD_BYTES;
use folio_core::port::MaintenanceConfig;
use folio_infra_auth::JwtConfig;
use folio_infra_sqlite::DEFAULT_MAX_CONNECTIONS;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "folio.toml";
const ENV_PREFIX: &str = "FOLIO";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub auth: AuthSection,
    pub storage: StorageSection,
    pub logging: LoggingSection,
    pub maintenance: MaintenanceSection,
    pub bootstrap: BootstrapSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Only enable behind a reverse proxy that overwrites `X-Forwarded-For`
    pub trust_proxy_headers: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            trust_proxy_headers: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://folio.db".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub open_registration: bool,
    pub secure_cookies: bool,
    pub rate_limit_burst: u32,
    pub rate_limit_per_sec: u32,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_secs: JwtConfig::DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: JwtConfig::DEFAULT_REFRESH_TTL_SECS,
            open_registration: false,
            secure_cookies: false,
            rate_limit_burst: 10,
            rate_limit_per_sec: 1,
        }
    }
}

impl std::fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSection")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("open_registration", &self.open_registration)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

impl AuthSection {
    pub fn jwt(&self) -> JwtConfig {
        JwtConfig {
            access_secret: self.access_secret.clone(),
            refresh_secret: self.refresh_secret.clone(),
            access_ttl_secs: self.access_ttl_secs,
            refresh_ttl_secs: self.refresh_ttl_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Gcs,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: StorageBackend,
    /// Directory for the local backend
    pub local_root: PathBuf,
    /// Base URL prefixed to object keys (local default `/uploads`)
    pub public_base_url: Option<String>,
    pub bucket: Option<String>,
    pub access_token: Option<String>,
    pub max_upload_bytes: u64,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_root: PathBuf::from("uploads"),
            public_base_url: None,
            bucket: None,
            access_token: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub format: LogFormat,
    /// Daily rolling log files are written here when set
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaintenanceSection {
    pub interval_hours: u64,
    pub activity_retention_days: i64,
    pub max_db_size_mb: f64,
}

impl Default for MaintenanceSection {
    fn default() -> Self {
        let defaults = MaintenanceConfig::default();
        Self {
            interval_hours: 24,
            activity_retention_days: defaults.activity_retention_days,
            max_db_size_mb: defaults.max_db_size_mb,
        }
    }
}

impl MaintenanceSection {
    pub fn policy(&self) -> MaintenanceConfig {
        MaintenanceConfig {
            activity_retention_days: self.activity_retention_days,
            max_db_size_mb: self.max_db_size_mb,
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct BootstrapSection {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl std::fmt::Debug for BootstrapSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapSection")
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load from `FOLIO_CONFIG` (or `./folio.toml` if present) and the process environment
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let file = explicit.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

        Self::load_from(file.as_deref(), explicit.is_some(), Environment::default())
    }

    /// Build from an optional file plus an environment source
    pub fn load_from(file: Option<&Path>, file_required: bool, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(file_required),
            );
        }

        let env = env
            .prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("server.cors_origins");

        let config: AppConfig = builder
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.auth
            .jwt()
            .validate()
            .context("auth.access_secret / auth.refresh_secret")?;

        if self.storage.backend == StorageBackend::Gcs
            && self.storage.bucket.as_deref().map_or(true, str::is_empty)
        {
            bail!("storage.bucket is required for the gcs backend");
        }

        if self.bootstrap.admin_email.is_some() != self.bootstrap.admin_password.is_some() {
            bail!("bootstrap.admin_email and bootstrap.admin_password must be set together");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    fn secrets() -> Vec<(&'static str, &'static str)> {
        vec![
            ("FOLIO_AUTH__ACCESS_SECRET", "access-secret-access-secret-access"),
            ("FOLIO_AUTH__REFRESH_SECRET", "refresh-secret-refresh-secret-refr"),
        ]
    }

    #[test]
    fn test_defaults_with_env_secrets() {
        let config = AppConfig::load_from(None, false, env(&secrets())).unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(!config.server.trust_proxy_headers);
        assert_eq!(config.database.url, "sqlite://folio.db");
        assert_eq!(config.auth.access_ttl_secs, 900);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.maintenance.activity_retention_days, 90);
    }

    #[test]
    fn test_missing_secrets_fail() {
        let err = AppConfig::load_from(None, false, env(&[])).unwrap_err();
        assert!(format!("{:#}", err).contains("at least 32 bytes"));
    }

    #[test]
    fn test_shared_secret_fails() {
        let same = "x".repeat(40);
        let err = AppConfig::load_from(
            None,
            false,
            env(&[
                ("FOLIO_AUTH__ACCESS_SECRET", same.as_str()),
                ("FOLIO_AUTH__REFRESH_SECRET", same.as_str()),
            ]),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("must differ"));
    }

    #[test]
    fn test_file_then_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000
cors_origins = ["https://example.com"]

[storage]
backend = "gcs"
bucket = "folio-media"

[logging]
format = "json"
"#
        )
        .unwrap();

        let mut vars = secrets();
        vars.push(("FOLIO_SERVER__PORT", "9100"));
        vars.push(("FOLIO_AUTH__OPEN_REGISTRATION", "true"));
        vars.push(("FOLIO_SERVER__TRUST_PROXY_HEADERS", "true"));

        let config = AppConfig::load_from(Some(file.path()), true, env(&vars)).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.cors_origins, vec!["https://example.com"]);
        assert_eq!(config.storage.backend, StorageBackend::Gcs);
        assert_eq!(config.storage.bucket.as_deref(), Some("folio-media"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.auth.open_registration);
        assert!(config.server.trust_proxy_headers);
    }

    #[test]
    fn test_gcs_requires_bucket() {
        let mut vars = secrets();
        vars.push(("FOLIO_STORAGE__BACKEND", "gcs"));
        let err = AppConfig::load_from(None, false, env(&vars)).unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));
    }

    #[test]
    fn test_secrets_are_redacted() {
        let config = AppConfig::load_from(None, false, env(&secrets())).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("access-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
