/// Database configuration and connection management
pub mod database;

/// Bootstrap administrator credentials from environment variables
pub mod admin;

/// Process settings (bind address, secrets, payment API) from environment variables
pub mod settings;

/// Store configuration loading from store.toml
pub mod store;
