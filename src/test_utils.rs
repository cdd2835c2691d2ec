//! Shared test utilities for the front desk.
//!
//! This module provides helpers for setting up in-memory test databases and a
//! standard fixture: one room type with a room, three rates, a product and a
//! clock pinned to a weekday morning in Mexico City.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        lifecycle::{CheckInRequest, check_in},
        product::{ProductInput, create_product},
        rate::{AdminGate, RateInput, create_rate},
        room::create_room,
        room_type::create_room_type,
        shift::ShiftClock,
        vehicle::VehicleInfo,
    },
    entities::{product, rate, room, room_type, stay},
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::America::Mexico_City;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;

pub use crate::core::clock::{Clock, FixedClock};

const TEST_ADMIN_PASSWORD: &str = "admin";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// 2024-05-10 10:00 in Mexico City, inside the morning shift.
#[must_use]
pub fn fixture_start() -> DateTime<Utc> {
    Mexico_City
        .with_ymd_and_hms(2024, 5, 10, 10, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Everything most tests need.
pub struct Fixture {
    /// Database with all tables
    pub db: DatabaseConnection,
    /// "Sencilla"
    pub room_type: room_type::Model,
    /// Room "101", available
    pub room: room::Model,
    /// 8 hours for 330
    pub standard_rate: rate::Model,
    /// 12 hours for 450
    pub premium_rate: rate::Model,
    /// 3 extra hours for 180
    pub extension_rate: rate::Model,
    /// "Refresco" at 25 with 10 in stock
    pub product: product::Model,
    /// Clock the fixture's shift clock reads
    pub clock: Arc<FixedClock>,
    /// Mexico City shift clock
    pub shift_clock: ShiftClock,
}

/// Creates a rate through the admin gate.
pub async fn create_test_rate(
    db: &DatabaseConnection,
    room_type_id: i64,
    name: &str,
    hours: i32,
    price: f64,
    is_extra_hour: bool,
) -> Result<rate::Model> {
    let auth = AdminGate::new(TEST_ADMIN_PASSWORD.to_string()).authorize(TEST_ADMIN_PASSWORD)?;
    create_rate(
        db,
        auth,
        RateInput {
            name: name.to_string(),
            hours,
            price,
            room_type_id,
            is_extra_hour,
        },
    )
    .await
}

/// Creates an available room.
pub async fn create_test_room(
    db: &DatabaseConnection,
    name: &str,
    room_type_id: i64,
) -> Result<room::Model> {
    create_room(db, name, room_type_id).await
}

/// Builds the standard fixture.
pub async fn setup_with_room() -> Result<Fixture> {
    let db = setup_test_db().await?;
    let room_type = create_room_type(&db, "Sencilla").await?;
    let room = create_test_room(&db, "101", room_type.id).await?;
    let standard_rate = create_test_rate(&db, room_type.id, "8 horas", 8, 330.0, false).await?;
    let premium_rate = create_test_rate(&db, room_type.id, "12 horas", 12, 450.0, false).await?;
    let extension_rate =
        create_test_rate(&db, room_type.id, "3 horas extra", 3, 180.0, true).await?;
    let product = create_product(
        &db,
        ProductInput {
            name: "Refresco".to_string(),
            price: 25.0,
            category: "Bebidas".to_string(),
        },
        10,
    )
    .await?;

    let clock = Arc::new(FixedClock::new(fixture_start()));
    let shift_clock = ShiftClock::new(Mexico_City, Arc::clone(&clock) as Arc<dyn Clock>);

    Ok(Fixture {
        db,
        room_type,
        room,
        standard_rate,
        premium_rate,
        extension_rate,
        product,
        clock,
        shift_clock,
    })
}

/// A normalised vehicle with plate "ABC-123".
#[must_use]
pub fn test_vehicle() -> VehicleInfo {
    VehicleInfo {
        plate: "ABC-123".to_string(),
        brand: Some("Nissan Versa".to_string()),
        color: Some("Gris".to_string()),
    }
}

/// Checks one guest into the fixture room on the standard rate, starting now.
pub async fn check_in_standard(fixture: &Fixture) -> Result<stay::Model> {
    let checked = check_in(
        &fixture.db,
        &fixture.shift_clock,
        fixture.room.id,
        CheckInRequest::for_rate(&fixture.standard_rate, fixture.clock.now(), 1),
    )
    .await?;
    Ok(checked.stay)
}

/// Makes every later UPDATE of room `room_id` abort, so a transition fails after
/// the writes that precede its room write.
pub async fn fail_room_updates(db: &DatabaseConnection, room_id: i64) -> Result<()> {
    db.execute_unprepared(&format!(
        "CREATE TRIGGER fail_room_{room_id}_updates BEFORE UPDATE ON rooms \
         FOR EACH ROW WHEN OLD.id = {room_id} \
         BEGIN SELECT RAISE(ABORT, 'room {room_id} is locked'); END"
    ))
    .await?;
    Ok(())
}
