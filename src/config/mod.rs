//! Configuration module

mod site;

pub use site::SiteConfig;
pub use site::AdminConfig;
pub use site::DraftingConfig;
pub use site::ImagesConfig;
pub use site::ServerConfig;
pub use site::StorageBackend;
pub use site::StorageConfig;
pub use site::ADMIN_PASSWORD_ENV;
