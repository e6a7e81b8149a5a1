//! Configuration and credential loading
//!
//! Settings come from the first config file found (explicit `--config`,
//! then `./prt.yaml`, then the user config directory), with environment
//! variables layered on top. Credentials are never read from files; they
//! come from the environment only, and `.env` is honored at startup.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("server.url is not configured; set it in prt.yaml or PRT_SERVER_URL")]
    MissingServerUrl,

    #[error("archives.host is not configured; set it in prt.yaml or PRT_ARCHIVES_HOST")]
    MissingArchivesHost,

    #[error("{vars} must be set in the environment (or in a local .env)")]
    MissingCredentials { vars: &'static str },
}

/// Toolkit configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub archives: ArchivesConfig,

    /// File-server mount prefix that foreign paths are re-rooted under.
    pub mount_prefix: String,

    /// Attempt budget for each remote operation.
    pub attempts: u32,

    /// How many recent projects to scan for candidate managers.
    pub lookback: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            archives: ArchivesConfig::default(),
            mount_prefix: "N:\\PPDO\\Records\\".to_string(),
            attempts: 3,
            lookback: 100,
        }
    }
}

/// FileMaker server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the FileMaker server, e.g. `https://fm.example.edu/`.
    pub url: String,
    pub database: String,
    pub projects_layout: String,
    pub people_layout: String,
    /// The servers this tool targets commonly run self-signed certs.
    pub verify_tls: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            database: "UCPPC".to_string(),
            projects_layout: "projects_table".to_string(),
            people_layout: "people_table".to_string(),
            verify_tls: false,
        }
    }
}

impl ServerConfig {
    pub fn layouts(&self) -> Layouts {
        Layouts {
            projects: self.projects_layout.clone(),
            people: self.people_layout.clone(),
        }
    }
}

/// Layout names the record client addresses.
#[derive(Debug, Clone)]
pub struct Layouts {
    pub projects: String,
    pub people: String,
}

/// Archives database (PostgreSQL) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchivesConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

impl Default for ArchivesConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 5432,
            dbname: "archives".to_string(),
        }
    }
}

impl ArchivesConfig {
    /// Key/value conninfo string for the postgres client.
    pub fn conninfo(&self, credentials: &Credentials) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.dbname, credentials.user, credentials.password
        )
    }
}

impl Config {
    /// Load configuration: the first file found wins, then environment
    /// variables override individual settings.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::config_file(explicit)? {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = explicit {
            // An explicitly named file that is missing is an error, not a
            // silent fallback.
            if !path.exists() {
                return Err(ConfigError::Unreadable {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        let local = PathBuf::from("prt.yaml");
        if local.exists() {
            return Ok(Some(local));
        }

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                return Ok(Some(global));
            }
        }

        Ok(None)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "prt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("PRT_SERVER_URL") {
            self.server.url = url;
        }
        if let Ok(database) = std::env::var("PRT_DATABASE") {
            self.server.database = database;
        }
        if let Ok(host) = std::env::var("PRT_ARCHIVES_HOST") {
            self.archives.host = host;
        }
        if let Ok(dbname) = std::env::var("PRT_ARCHIVES_DBNAME") {
            self.archives.dbname = dbname;
        }
        if let Ok(mount) = std::env::var("PRT_MOUNT_PREFIX") {
            self.mount_prefix = mount;
        }
    }

    /// Fail early when the record server has not been pointed at anything.
    pub fn require_server_url(&self) -> Result<(), ConfigError> {
        if self.server.url.trim().is_empty() {
            return Err(ConfigError::MissingServerUrl);
        }
        Ok(())
    }

    pub fn require_archives_host(&self) -> Result<(), ConfigError> {
        if self.archives.host.trim().is_empty() {
            return Err(ConfigError::MissingArchivesHost);
        }
        Ok(())
    }
}

/// A user/password pair sourced from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    /// FileMaker account: `PRT_FM_USER` / `PRT_FM_PASSWORD`.
    pub fn filemaker_from_env() -> Result<Self, ConfigError> {
        Self::from_env(
            "PRT_FM_USER",
            "PRT_FM_PASSWORD",
            "PRT_FM_USER and PRT_FM_PASSWORD",
        )
    }

    /// Archives database account: `PRT_ARCHIVES_USER` / `PRT_ARCHIVES_PASSWORD`.
    pub fn archives_from_env() -> Result<Self, ConfigError> {
        Self::from_env(
            "PRT_ARCHIVES_USER",
            "PRT_ARCHIVES_PASSWORD",
            "PRT_ARCHIVES_USER and PRT_ARCHIVES_PASSWORD",
        )
    }

    fn from_env(
        user_var: &str,
        password_var: &str,
        vars: &'static str,
    ) -> Result<Self, ConfigError> {
        match (std::env::var(user_var), std::env::var(password_var)) {
            (Ok(user), Ok(password)) if !user.is_empty() => Ok(Self { user, password }),
            _ => Err(ConfigError::MissingCredentials { vars }),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep passwords out of logs and panics.
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.database, "UCPPC");
        assert_eq!(config.server.projects_layout, "projects_table");
        assert_eq!(config.server.people_layout, "people_table");
        assert!(!config.server.verify_tls);
        assert_eq!(config.mount_prefix, "N:\\PPDO\\Records\\");
        assert_eq!(config.attempts, 3);
        assert_eq!(config.lookback, 100);
        assert_eq!(config.archives.port, 5432);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yml::from_str(
            r#"
server:
  url: https://fm.example.edu/
mount_prefix: "M:\\Mirror\\"
"#,
        )
        .unwrap();
        assert_eq!(config.server.url, "https://fm.example.edu/");
        assert_eq!(config.server.database, "UCPPC");
        assert_eq!(config.mount_prefix, "M:\\Mirror\\");
        assert_eq!(config.lookback, 100);
    }

    #[test]
    fn test_missing_server_url_is_reported() {
        let config = Config::default();
        assert!(matches!(
            config.require_server_url(),
            Err(ConfigError::MissingServerUrl)
        ));
    }

    #[test]
    fn test_conninfo() {
        let archives = ArchivesConfig {
            host: "db.example.edu".to_string(),
            ..ArchivesConfig::default()
        };
        let creds = Credentials {
            user: "records".to_string(),
            password: "pw".to_string(),
        };
        assert_eq!(
            archives.conninfo(&creds),
            "host=db.example.edu port=5432 dbname=archives user=records password=pw"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            user: "records".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("records"));
        assert!(!debug.contains("hunter2"));
    }
}
