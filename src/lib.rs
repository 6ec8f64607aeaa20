//! anomia: a small blog server with a storage-independent content repository
//!
//! Posts and comments live behind [`store::Repository`], which can be backed
//! by a JSON document file, an in-process document or a SQLite database. The
//! [`server`] module exposes the repository as a JSON API with a server-side
//! admin gate, and [`drafting`] talks to an external generative service.

pub mod auth;
pub mod commands;
pub mod config;
pub mod content;
pub mod drafting;
pub mod helpers;
pub mod server;
pub mod store;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::StorageBackend;
use store::{Author, ContentStore, ImagePlaceholder, JsonFileStore, MemoryStore, Repository};

/// The main application: a site directory and its configuration
#[derive(Clone)]
pub struct Anomia {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
}

impl Anomia {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self { config, base_dir })
    }

    /// Location of the backing store file
    pub fn storage_path(&self) -> PathBuf {
        self.base_dir.join(self.config.storage.file_name())
    }

    /// Construct the configured store and wrap it in a repository
    pub fn open_repository(&self) -> Result<Repository> {
        let store: Arc<dyn ContentStore> = match self.config.storage.backend {
            StorageBackend::Json => Arc::new(JsonFileStore::new(self.storage_path())),
            StorageBackend::Memory => {
                tracing::warn!("Using the memory store, content is lost on exit");
                Arc::new(MemoryStore::new())
            }
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => Arc::new(store::SqliteStore::open(self.storage_path())?),
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => {
                anyhow::bail!("The sqlite backend requires the `sqlite` feature")
            }
        };

        let author = Author {
            name: self.config.author.clone(),
            image: self.config.author_image.clone(),
        };
        let placeholder = ImagePlaceholder::new(self.config.images.placeholder.clone());

        Ok(Repository::new(store, author, placeholder))
    }

    /// The drafting client, or a disabled one when no endpoint is configured
    pub fn drafter(&self) -> Result<Arc<dyn drafting::Drafter>> {
        Ok(drafting::from_config(&self.config.drafting)?)
    }
}
