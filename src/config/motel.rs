//! Motel configuration loading from config.toml
//!
//! The `[motel]` table holds operating settings (time zone, alert timing). The
//! remaining tables describe the fixed inventory used to seed an empty database:
//! room types, rates, rooms, menu products and staff.

use crate::errors::{Error, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Operating settings
    pub motel: MotelSettings,
    /// Pricing tiers to seed
    #[serde(default)]
    pub room_types: Vec<RoomTypeConfig>,
    /// Rates to seed
    #[serde(default)]
    pub rates: Vec<RateConfig>,
    /// Rooms to seed
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
    /// Menu products to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
    /// Staff accounts to seed
    #[serde(default)]
    pub employees: Vec<EmployeeConfig>,
}

/// Operating settings for the front desk.
#[derive(Debug, Deserialize, Clone)]
pub struct MotelSettings {
    /// IANA time zone the shifts are computed in (e.g., `America/Mexico_City`)
    pub timezone: String,
    /// Rooms within this many minutes of check-out are flagged
    #[serde(default = "default_expiry_warning_minutes")]
    pub expiry_warning_minutes: i64,
    /// How often the expiry scan runs
    #[serde(default = "default_alert_interval_seconds")]
    pub alert_interval_seconds: u64,
}

const fn default_expiry_warning_minutes() -> i64 {
    10
}

const fn default_alert_interval_seconds() -> u64 {
    30
}

impl MotelSettings {
    /// Resolves the configured time zone name.
    ///
    /// # Errors
    /// Returns an error if the name is not a known IANA zone.
    pub fn time_zone(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| Error::Config {
            message: format!("Unknown timezone '{}': {e}", self.timezone),
        })
    }
}

/// A pricing tier
#[derive(Debug, Deserialize, Clone)]
pub struct RoomTypeConfig {
    /// Name of the room type
    pub name: String,
}

/// A rate for one room type
#[derive(Debug, Deserialize, Clone)]
pub struct RateConfig {
    /// Name of the rate
    pub name: String,
    /// Room type name this rate applies to
    pub room_type: String,
    /// Stay duration granted
    pub hours: i32,
    /// Price of the rate
    pub price: f64,
    /// Whether this is an extension rate
    #[serde(default)]
    pub is_extra_hour: bool,
}

/// A room in the fixed inventory
#[derive(Debug, Deserialize, Clone)]
pub struct RoomConfig {
    /// Room name (e.g., "101")
    pub name: String,
    /// Room type name
    pub room_type: String,
}

/// A menu product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Product name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Initial stock
    #[serde(default)]
    pub stock: i32,
    /// Menu category
    pub category: String,
}

/// A staff account
#[derive(Debug, Deserialize, Clone)]
pub struct EmployeeConfig {
    /// Full name
    pub name: String,
    /// Job role
    pub role: String,
}

/// Loads the motel configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.as_ref().display()),
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration text.
///
/// # Errors
/// Returns an error if the TOML is invalid, the time zone is unknown, or a rate or
/// room names a room type that is not declared.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    config.motel.time_zone()?;

    let known = |name: &str| config.room_types.iter().any(|t| t.name == name);
    for rate in &config.rates {
        if !known(&rate.room_type) {
            return Err(Error::Config {
                message: format!(
                    "Rate '{}' references unknown room type '{}'",
                    rate.name, rate.room_type
                ),
            });
        }
    }
    for room in &config.rooms {
        if !known(&room.room_type) {
            return Err(Error::Config {
                message: format!(
                    "Room '{}' references unknown room type '{}'",
                    room.name, room.room_type
                ),
            });
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    const SAMPLE: &str = r#"
        [motel]
        timezone = "America/Mexico_City"

        [[room_types]]
        name = "Sencilla"

        [[rates]]
        name = "8 horas"
        room_type = "Sencilla"
        hours = 8
        price = 330.0

        [[rates]]
        name = "3 horas extra"
        room_type = "Sencilla"
        hours = 3
        price = 180.0
        is_extra_hour = true

        [[rooms]]
        name = "101"
        room_type = "Sencilla"

        [[products]]
        name = "Refresco"
        price = 25.0
        stock = 48
        category = "Bebidas"

        [[employees]]
        name = "Lucía"
        role = "Recepción"
    "#;

    #[test]
    fn test_parse_motel_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.motel.expiry_warning_minutes, 10);
        assert_eq!(config.motel.alert_interval_seconds, 30);
        assert_eq!(config.motel.time_zone().unwrap(), chrono_tz::America::Mexico_City);
        assert_eq!(config.rates.len(), 2);
        assert!(!config.rates[0].is_extra_hour);
        assert!(config.rates[1].is_extra_hour);
        assert_eq!(config.rates[1].price, 180.0);
        assert_eq!(config.rooms[0].name, "101");
        assert_eq!(config.products[0].stock, 48);
        assert_eq!(config.employees[0].role, "Recepción");
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let result = parse_config(
            r#"
            [motel]
            timezone = "Mars/Olympus_Mons"
        "#,
        );
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_room_with_unknown_type_rejected() {
        let result = parse_config(
            r#"
            [motel]
            timezone = "UTC"

            [[rooms]]
            name = "101"
            room_type = "Suite"
        "#,
        );
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
