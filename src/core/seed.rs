//! Seeding the fixed inventory from config.toml.
//!
//! Runs in one database transaction. Rows whose name already exists are skipped,
//! so seeding on every start-up only adds what the configuration gained.

use crate::{
    config::motel::Config,
    entities::{
        Employee, EmployeeStatus, Product, Rate, Room, RoomStatus, RoomType, employee, product,
        rate, room, room_type,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};

/// Rows inserted per table by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Room types inserted
    pub room_types: usize,
    /// Rates inserted
    pub rates: usize,
    /// Rooms inserted
    pub rooms: usize,
    /// Products inserted
    pub products: usize,
    /// Employees inserted
    pub employees: usize,
}

impl SeedReport {
    /// Total rows inserted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.room_types + self.rates + self.rooms + self.products + self.employees
    }
}

/// Inserts every configured row that is not yet in the database.
///
/// # Errors
/// Returns an error if a configured room type cannot be resolved or a write
/// fails. Nothing is written on error.
pub async fn seed_from_config(db: &DatabaseConnection, config: &Config) -> Result<SeedReport> {
    info!(
        "Seeding inventory: {} room types, {} rates, {} rooms, {} products, {} employees in config",
        config.room_types.len(),
        config.rates.len(),
        config.rooms.len(),
        config.products.len(),
        config.employees.len()
    );
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    let mut type_ids: HashMap<String, i64> = RoomType::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|t| (t.name, t.id))
        .collect();
    for cfg in &config.room_types {
        if type_ids.contains_key(&cfg.name) {
            debug!("Room type '{}' already exists. Skipping.", cfg.name);
            continue;
        }
        let model = room_type::ActiveModel {
            name: Set(cfg.name.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        type_ids.insert(model.name, model.id);
        report.room_types += 1;
    }
    let type_id = |name: &str| {
        type_ids.get(name).copied().ok_or_else(|| Error::Config {
            message: format!("Unknown room type '{name}'"),
        })
    };

    let existing_rates: Vec<(String, i64)> = Rate::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| (r.name, r.room_type_id))
        .collect();
    for cfg in &config.rates {
        let room_type_id = type_id(&cfg.room_type)?;
        if existing_rates.contains(&(cfg.name.clone(), room_type_id)) {
            debug!("Rate '{}' for '{}' already exists. Skipping.", cfg.name, cfg.room_type);
            continue;
        }
        rate::ActiveModel {
            name: Set(cfg.name.clone()),
            hours: Set(cfg.hours),
            price: Set(cfg.price),
            room_type_id: Set(room_type_id),
            is_extra_hour: Set(cfg.is_extra_hour),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.rates += 1;
    }

    let room_names: Vec<String> = Room::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();
    for cfg in &config.rooms {
        if room_names.contains(&cfg.name) {
            debug!("Room '{}' already exists. Skipping.", cfg.name);
            continue;
        }
        let mut active = room::ActiveModel {
            name: Set(cfg.name.clone()),
            room_type_id: Set(type_id(&cfg.room_type)?),
            ..Default::default()
        };
        crate::core::room::clear_occupancy(&mut active, RoomStatus::Available);
        active.insert(&txn).await?;
        report.rooms += 1;
    }

    let product_names: Vec<String> = Product::find()
        .filter(product::Column::IsDeleted.eq(false))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();
    let now = chrono::Utc::now().naive_utc();
    for cfg in &config.products {
        if product_names.contains(&cfg.name) {
            debug!("Product '{}' already exists. Skipping.", cfg.name);
            continue;
        }
        product::ActiveModel {
            name: Set(cfg.name.clone()),
            price: Set(cfg.price),
            stock: Set(cfg.stock.max(0)),
            category: Set(cfg.category.clone()),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.products += 1;
    }

    let employee_names: Vec<String> = Employee::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|e| e.name)
        .collect();
    for cfg in &config.employees {
        if employee_names.contains(&cfg.name) {
            debug!("Employee '{}' already exists. Skipping.", cfg.name);
            continue;
        }
        employee::ActiveModel {
            name: Set(cfg.name.clone()),
            role: Set(cfg.role.clone()),
            status: Set(EmployeeStatus::Active),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.employees += 1;
    }

    txn.commit().await?;
    info!("Finished seeding: {} rows inserted", report.total());
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::motel::parse_config;
    use crate::core::{rate::{get_check_in_rates, get_extension_rate}, room::get_all_rooms};
    use crate::test_utils::*;

    const CONFIG: &str = r#"
        [motel]
        timezone = "America/Mexico_City"

        [[room_types]]
        name = "Sencilla"

        [[room_types]]
        name = "Jacuzzi"

        [[rates]]
        name = "8 horas"
        room_type = "Sencilla"
        hours = 8
        price = 330.0

        [[rates]]
        name = "Extra 3 horas"
        room_type = "Sencilla"
        hours = 3
        price = 180.0
        is_extra_hour = true

        [[rates]]
        name = "8 horas"
        room_type = "Jacuzzi"
        hours = 8
        price = 600.0

        [[rooms]]
        name = "101"
        room_type = "Sencilla"

        [[rooms]]
        name = "201"
        room_type = "Jacuzzi"

        [[products]]
        name = "Refresco"
        price = 25.0
        stock = 24
        category = "Bebidas"

        [[employees]]
        name = "Lucía"
        role = "Recepción"
    "#;

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CONFIG)?;

        let first = seed_from_config(&db, &config).await?;
        assert_eq!(
            first,
            SeedReport {
                room_types: 2,
                rates: 3,
                rooms: 2,
                products: 1,
                employees: 1,
            }
        );

        let second = seed_from_config(&db, &config).await?;
        assert_eq!(second.total(), 0);

        let rooms = get_all_rooms(&db).await?;
        assert_eq!(rooms.len(), 2);
        assert!(rooms.iter().all(|r| r.status == RoomStatus::Available));

        let sencilla = rooms[0].room_type_id;
        assert!(get_extension_rate(&db, sencilla).await?.is_some());
        assert_eq!(get_check_in_rates(&db, sencilla).await?.len(), 1);
        Ok(())
    }
}
