//! Settings read from the process environment (typically populated from `.env`).

use crate::errors::{Error, Result};

/// Default location of the TOML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Path of the TOML configuration file, from `MOTEL_CONFIG` or the default.
#[must_use]
pub fn config_path() -> String {
    std::env::var("MOTEL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Shared administrative password guarding rate changes, from `ADMIN_PASSWORD`.
///
/// # Errors
/// Returns an error if the variable is missing or empty.
pub fn admin_password() -> Result<String> {
    let password = std::env::var("ADMIN_PASSWORD")?;
    if password.trim().is_empty() {
        return Err(Error::Config {
            message: "ADMIN_PASSWORD is set but empty".to_string(),
        });
    }
    Ok(password)
}
