//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable that overrides `admin.password`
pub const ADMIN_PASSWORD_ENV: &str = "ANOMIA_ADMIN_PASSWORD";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // Author identity stamped on every post
    pub author: String,
    pub author_image: String,

    pub storage: StorageConfig,
    pub images: ImagesConfig,
    pub admin: AdminConfig,
    pub drafting: DraftingConfig,
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "A Anomia".to_string(),
            description: "Filosofia para o cotidiano".to_string(),
            language: "pt-BR".to_string(),

            author: "A Anomia".to_string(),
            author_image: "https://picsum.photos/seed/author/100/100".to_string(),

            storage: StorageConfig::default(),
            images: ImagesConfig::default(),
            admin: AdminConfig::default(),
            drafting: DraftingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides taken from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
            if !password.is_empty() {
                self.admin.password = password;
                tracing::debug!("Admin password taken from {}", ADMIN_PASSWORD_ENV);
            }
        }
    }
}

/// Which physical store backs the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Memory,
    Sqlite,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Relative to the site directory. Defaults per backend.
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: None,
        }
    }
}

impl StorageConfig {
    pub fn file_name(&self) -> &str {
        match (&self.path, self.backend) {
            (Some(path), _) => path.as_str(),
            (None, StorageBackend::Sqlite) => "anomia.sqlite3",
            (None, _) => "db.json",
        }
    }
}

/// Cover image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Placeholder URL template; `:seed` is replaced per post
    pub placeholder: String,
    pub default_hint: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            placeholder: "https://picsum.photos/seed/:seed/1200/800".to_string(),
            default_hint: "filosofia abstrata".to_string(),
        }
    }
}

/// Single admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    /// Empty disables login
    pub password: String,
    /// Lifetime of a login token
    pub session_ttl_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
            session_ttl_secs: 12 * 60 * 60,
        }
    }
}

/// External drafting service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftingConfig {
    /// Base URL; drafting is disabled when unset
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
