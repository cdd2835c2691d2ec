//! Rate business logic - Pricing packages and the administrative gate.
//!
//! Check-in and package upgrades only ever offer regular rates; rates flagged
//! `is_extra_hour` are reserved for stay extensions. Creating, editing and
//! deleting rates requires an [`AdminAuthorization`] issued by the [`AdminGate`].

use crate::{
    entities::{Rate, Room, RoomType, rate, room},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, warn};

/// Hours granted by the designated extension rate of a room type.
pub const EXTENSION_HOURS: i32 = 3;

/// Checks the shared administrative password.
#[derive(Clone)]
pub struct AdminGate {
    password: String,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate").finish_non_exhaustive()
    }
}

/// Proof that the administrative password was entered correctly.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuthorization {
    _private: (),
}

impl AdminGate {
    /// Creates a gate guarding with `password`.
    #[must_use]
    pub const fn new(password: String) -> Self {
        Self { password }
    }

    /// Checks `attempt` against the configured password.
    ///
    /// # Errors
    /// Returns `AdminDenied` on a mismatch.
    pub fn authorize(&self, attempt: &str) -> Result<AdminAuthorization> {
        if attempt == self.password {
            Ok(AdminAuthorization { _private: () })
        } else {
            warn!("Administrative password rejected");
            Err(Error::AdminDenied)
        }
    }
}

/// Fields of a rate being created or edited.
#[derive(Debug, Clone)]
pub struct RateInput {
    /// Display name
    pub name: String,
    /// Stay duration granted
    pub hours: i32,
    /// Price of the rate
    pub price: f64,
    /// Room type the rate applies to
    pub room_type_id: i64,
    /// Whether this is an extension rate
    pub is_extra_hour: bool,
}

fn validate_rate(input: &RateInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Rate name cannot be empty".to_string(),
        });
    }
    if input.hours <= 0 {
        return Err(Error::Validation {
            message: format!("Rate hours must be positive, got {}", input.hours),
        });
    }
    if input.price < 0.0 || !input.price.is_finite() {
        return Err(Error::InvalidAmount {
            amount: input.price,
        });
    }
    Ok(())
}

/// Retrieves every rate ordered by id.
pub async fn get_all_rates(db: &DatabaseConnection) -> Result<Vec<rate::Model>> {
    Rate::find()
        .order_by_asc(rate::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a rate by id.
pub async fn get_rate_by_id<C>(db: &C, rate_id: i64) -> Result<Option<rate::Model>>
where
    C: ConnectionTrait,
{
    Rate::find_by_id(rate_id).one(db).await.map_err(Into::into)
}

/// Rates offered at check-in for a room type, cheapest first.
///
/// Extension rates are never included.
pub async fn get_check_in_rates(
    db: &DatabaseConnection,
    room_type_id: i64,
) -> Result<Vec<rate::Model>> {
    Rate::find()
        .filter(rate::Column::RoomTypeId.eq(room_type_id))
        .filter(rate::Column::IsExtraHour.eq(false))
        .order_by_asc(rate::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The designated extension rate of a room type: the extra-hour rate granting
/// exactly [`EXTENSION_HOURS`].
pub async fn get_extension_rate<C>(db: &C, room_type_id: i64) -> Result<Option<rate::Model>>
where
    C: ConnectionTrait,
{
    Rate::find()
        .filter(rate::Column::RoomTypeId.eq(room_type_id))
        .filter(rate::Column::IsExtraHour.eq(true))
        .filter(rate::Column::Hours.eq(EXTENSION_HOURS))
        .order_by_asc(rate::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Number of rooms whose running stay is on `rate_id`.
///
/// Release clears `rate_id`, so only occupied rooms are counted.
pub async fn rooms_on_rate(db: &DatabaseConnection, rate_id: i64) -> Result<u64> {
    Room::find()
        .filter(room::Column::RateId.eq(rate_id))
        .count(db)
        .await
        .map_err(Into::into)
}

async fn ensure_room_type_exists(db: &DatabaseConnection, room_type_id: i64) -> Result<()> {
    RoomType::find_by_id(room_type_id)
        .one(db)
        .await?
        .ok_or(Error::RoomTypeNotFound { id: room_type_id })?;
    Ok(())
}

/// Creates a rate.
///
/// # Errors
/// Returns an error if the input is invalid, the room type does not exist, or the
/// insert fails.
pub async fn create_rate(
    db: &DatabaseConnection,
    _auth: AdminAuthorization,
    input: RateInput,
) -> Result<rate::Model> {
    validate_rate(&input)?;
    ensure_room_type_exists(db, input.room_type_id).await?;

    let model = rate::ActiveModel {
        name: Set(input.name.trim().to_string()),
        hours: Set(input.hours),
        price: Set(input.price),
        room_type_id: Set(input.room_type_id),
        is_extra_hour: Set(input.is_extra_hour),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(rate_id = model.id, "Created rate '{}'", model.name);
    Ok(model)
}

/// Replaces every field of an existing rate.
///
/// Stays already running keep the times and debt they were charged; only future
/// check-ins, upgrades and extensions see the new values. While a stay runs on the
/// rate its room type and extension flag are fixed.
///
/// # Errors
/// Returns `RateInUse` when an in-use rate would change room type or extension
/// flag, otherwise an error if the input is invalid, the rate or room type does
/// not exist, or the update fails.
pub async fn update_rate(
    db: &DatabaseConnection,
    _auth: AdminAuthorization,
    rate_id: i64,
    input: RateInput,
) -> Result<rate::Model> {
    validate_rate(&input)?;
    ensure_room_type_exists(db, input.room_type_id).await?;

    let existing = get_rate_by_id(db, rate_id)
        .await?
        .ok_or(Error::RateNotFound { id: rate_id })?;

    if existing.room_type_id != input.room_type_id || existing.is_extra_hour != input.is_extra_hour
    {
        let rooms = rooms_on_rate(db, rate_id).await?;
        if rooms > 0 {
            warn!(rate_id, rooms, "Refusing to reclassify rate in use");
            return Err(Error::RateInUse { id: rate_id, rooms });
        }
    }

    let mut rate: rate::ActiveModel = existing.into();

    rate.name = Set(input.name.trim().to_string());
    rate.hours = Set(input.hours);
    rate.price = Set(input.price);
    rate.room_type_id = Set(input.room_type_id);
    rate.is_extra_hour = Set(input.is_extra_hour);

    let updated = rate.update(db).await?;
    info!(rate_id, "Updated rate '{}'", updated.name);
    Ok(updated)
}

/// Deletes a rate no running stay is on.
///
/// # Errors
/// Returns `RateInUse` while occupied rooms reference it, `RateNotFound` if it
/// does not exist, or a database error.
pub async fn delete_rate(
    db: &DatabaseConnection,
    _auth: AdminAuthorization,
    rate_id: i64,
) -> Result<()> {
    let rate = get_rate_by_id(db, rate_id)
        .await?
        .ok_or(Error::RateNotFound { id: rate_id })?;

    let rooms = rooms_on_rate(db, rate_id).await?;
    if rooms > 0 {
        warn!(rate_id, rooms, "Refusing to delete rate in use");
        return Err(Error::RateInUse { id: rate_id, rooms });
    }

    rate.delete(db).await?;
    info!(rate_id, "Deleted rate");
    Ok(())
}
