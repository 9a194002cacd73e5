use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Backend the checks run against when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://custorbit-1.preview.emergentagent.com/api";

/// Per-call timeout (ms)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PORTAL_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("no roles configured")]
    NoRoles,

    #[error("role '{0}' is configured more than once")]
    DuplicateRole(String),

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Login credentials for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCredential {
    pub role: String,
    pub email: String,
    pub password: String,
}

impl RoleCredential {
    pub fn new(role: &str, email: &str, password: &str) -> Self {
        Self {
            role: role.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// API root, e.g. "https://host/api" (no trailing slash)
    pub base_url: String,

    /// Per-call timeout (ms)
    pub timeout_ms: u64,

    /// Roles in run order
    pub roles: Vec<RoleCredential>,

    /// Endpoint catalog replacing the built-in one
    pub catalog: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            roles: vec![
                RoleCredential::new("admin", "admin@smartrep.dk", "admin123"),
                RoleCredential::new("customer", "kunde@huscompagniet.dk", "admin123"),
                RoleCredential::new("technician", "tekniker@smartrep.dk", "admin123"),
            ],
            catalog: None,
        }
    }
}

/// Config file layer; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    roles: Option<Vec<RoleCredential>>,
    catalog: Option<PathBuf>,
}

impl Config {
    /// Defaults, then the optional YAML file, then process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Merge a YAML config file over the current values
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.apply_yaml(&content, path)
    }

    fn apply_yaml(&mut self, content: &str, path: &Path) -> Result<(), ConfigError> {
        let file: ConfigFile =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(base_url) = file.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_ms) = file.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(roles) = file.roles {
            self.roles = roles;
        }
        if let Some(catalog) = file.catalog {
            // Relative catalog paths are relative to the config file
            self.catalog = Some(match path.parent() {
                Some(dir) if catalog.is_relative() => dir.join(catalog),
                _ => catalog,
            });
        }
        Ok(())
    }

    /// Apply `PORTAL_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(&format!("{}BASE_URL", ENV_PREFIX)) {
            self.base_url = url;
        }

        let timeout_key = format!("{}TIMEOUT_MS", ENV_PREFIX);
        if let Some(raw) = lookup(&timeout_key) {
            self.timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: timeout_key.clone(),
                value: raw.clone(),
            })?;
        }

        if let Some(catalog) = lookup(&format!("{}CATALOG", ENV_PREFIX)) {
            self.catalog = Some(PathBuf::from(catalog));
        }

        for cred in &mut self.roles {
            let role_key = env_role_key(&cred.role);
            if let Some(email) = lookup(&format!("{}{}_EMAIL", ENV_PREFIX, role_key)) {
                cred.email = email;
            }
            if let Some(password) = lookup(&format!("{}{}_PASSWORD", ENV_PREFIX, role_key)) {
                cred.password = password;
            }
        }
        Ok(())
    }

    /// Keep only the named roles, preserving configured order
    pub fn retain_roles(&mut self, names: &[String]) -> Result<(), ConfigError> {
        for name in names {
            if !self.roles.iter().any(|r| &r.role == name) {
                return Err(ConfigError::UnknownRole(name.clone()));
            }
        }
        self.roles.retain(|r| names.contains(&r.role));
        Ok(())
    }

    /// Normalize and check the final configuration
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.roles.is_empty() {
            return Err(ConfigError::NoRoles);
        }

        let mut seen = HashSet::new();
        for cred in &self.roles {
            if !seen.insert(cred.role.as_str()) {
                return Err(ConfigError::DuplicateRole(cred.role.clone()));
            }
        }
        Ok(())
    }
}

/// "field-tech" -> "FIELD_TECH"
fn env_role_key(role: &str) -> String {
    role.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
