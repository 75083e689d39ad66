/// Database configuration and connection management
pub mod database;

/// Feed limits and other settings from config.toml
pub mod settings;
