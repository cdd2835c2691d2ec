//! Room type business logic - Pricing tiers.
//!
//! A room type cannot be deleted while any room or rate still references it.

use crate::{
    entities::{Rate, RoomType, rate, room, room_type},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, warn};

/// Retrieves all room types ordered by id.
pub async fn get_all_room_types(db: &DatabaseConnection) -> Result<Vec<room_type::Model>> {
    RoomType::find()
        .order_by_asc(room_type::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a room type by name.
pub async fn get_room_type_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<room_type::Model>> {
    RoomType::find()
        .filter(room_type::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new room type.
///
/// # Errors
/// Returns an error if the name is empty or the insert fails.
pub async fn create_room_type(db: &DatabaseConnection, name: &str) -> Result<room_type::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Room type name cannot be empty".to_string(),
        });
    }

    let model = room_type::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(room_type_id = model.id, "Created room type '{}'", model.name);
    Ok(model)
}

/// Deletes a room type that nothing references.
///
/// # Errors
/// Returns `RoomTypeInUse` while rooms or rates point at it, `RoomTypeNotFound`
/// if it does not exist.
pub async fn delete_room_type(db: &DatabaseConnection, room_type_id: i64) -> Result<()> {
    let existing = RoomType::find_by_id(room_type_id)
        .one(db)
        .await?
        .ok_or(Error::RoomTypeNotFound { id: room_type_id })?;

    let rooms = crate::entities::Room::find()
        .filter(room::Column::RoomTypeId.eq(room_type_id))
        .count(db)
        .await?;
    let rates = Rate::find()
        .filter(rate::Column::RoomTypeId.eq(room_type_id))
        .count(db)
        .await?;

    if rooms > 0 || rates > 0 {
        warn!(room_type_id, rooms, rates, "Refusing to delete room type in use");
        return Err(Error::RoomTypeInUse {
            id: room_type_id,
            rooms,
            rates,
        });
    }

    existing.delete(db).await?;
    info!(room_type_id, "Deleted room type");
    Ok(())
}
