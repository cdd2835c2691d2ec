/// Database configuration and connection management
pub mod database;

/// Motel settings and seed inventory loaded from config.toml
pub mod motel;

/// Environment-provided settings (database URL, config path, admin password)
pub mod env;
