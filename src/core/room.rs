//! Room inventory and the housekeeping side of the room lifecycle.
//!
//! Rooms are created at setup time and never deleted. Guest-facing transitions
//! (check-in, release, swap, upgrades, extensions, headcount) live in
//! [`crate::core::lifecycle`]; this module covers the inventory itself, the
//! cleaning/maintenance branch and the remote-control counters.

use crate::{
    entities::{Room, RoomStatus, RoomType, room},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Most remote controls of one kind a room can have on loan.
pub const MAX_CONTROLS: i32 = 2;

/// Remote controls loaned to a guest, clamped to `0..=MAX_CONTROLS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlCounts {
    tv: i32,
    ac: i32,
}

impl ControlCounts {
    /// Builds counts, clamping each to the allowed range.
    #[must_use]
    pub fn new(tv: i32, ac: i32) -> Self {
        Self {
            tv: tv.clamp(0, MAX_CONTROLS),
            ac: ac.clamp(0, MAX_CONTROLS),
        }
    }

    /// TV remotes on loan.
    #[must_use]
    pub const fn tv(self) -> i32 {
        self.tv
    }

    /// A/C remotes on loan.
    #[must_use]
    pub const fn ac(self) -> i32 {
        self.ac
    }

    /// Whether every remote is back at the desk.
    #[must_use]
    pub const fn all_returned(self) -> bool {
        self.tv == 0 && self.ac == 0
    }
}

impl From<&room::Model> for ControlCounts {
    fn from(room: &room::Model) -> Self {
        Self::new(room.tv_controls, room.ac_controls)
    }
}

/// Retrieves every room ordered by id.
pub async fn get_all_rooms(db: &DatabaseConnection) -> Result<Vec<room::Model>> {
    Room::find()
        .order_by_asc(room::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a room by id.
pub async fn get_room_by_id<C>(db: &C, room_id: i64) -> Result<Option<room::Model>>
where
    C: ConnectionTrait,
{
    Room::find_by_id(room_id).one(db).await.map_err(Into::into)
}

/// Finds a room by its display name.
pub async fn get_room_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<room::Model>> {
    Room::find()
        .filter(room::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Rooms currently in `status`, ordered by id.
pub async fn get_rooms_by_status(
    db: &DatabaseConnection,
    status: RoomStatus,
) -> Result<Vec<room::Model>> {
    Room::find()
        .filter(room::Column::Status.eq(status))
        .order_by_asc(room::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a room to the inventory, available and empty.
///
/// # Errors
/// Returns an error if the name is empty, the room type does not exist, or the
/// insert fails.
pub async fn create_room(
    db: &DatabaseConnection,
    name: &str,
    room_type_id: i64,
) -> Result<room::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Room name cannot be empty".to_string(),
        });
    }
    RoomType::find_by_id(room_type_id)
        .one(db)
        .await?
        .ok_or(Error::RoomTypeNotFound { id: room_type_id })?;

    let mut active = room::ActiveModel {
        name: Set(name.to_string()),
        room_type_id: Set(room_type_id),
        ..Default::default()
    };
    clear_occupancy(&mut active, RoomStatus::Available);

    let model = active.insert(db).await?;
    info!(room_id = model.id, "Created room '{}'", model.name);
    Ok(model)
}

/// Resets every occupancy field and sets `status`.
pub(crate) fn clear_occupancy(room: &mut room::ActiveModel, status: RoomStatus) {
    room.status = Set(status);
    room.check_in_time = Set(None);
    room.check_out_time = Set(None);
    room.rate_id = Set(None);
    room.total_debt = Set(0.0);
    room.persons = Set(0);
    room.tv_controls = Set(0);
    room.ac_controls = Set(0);
    room.customer_name = Set(None);
    room.vehicle_plate = Set(None);
    room.vehicle_brand = Set(None);
    room.vehicle_color = Set(None);
}

async fn load_room(db: &DatabaseConnection, room_id: i64) -> Result<room::Model> {
    get_room_by_id(db, room_id)
        .await?
        .ok_or(Error::RoomNotFound { id: room_id })
}

/// Finishes housekeeping: Cleaning, Maintenance or Deep-clean become Available.
///
/// # Errors
/// Refused for occupied or already available rooms.
#[instrument(skip(db))]
pub async fn mark_available(db: &DatabaseConnection, room_id: i64) -> Result<room::Model> {
    let room = load_room(db, room_id).await?;
    match room.status {
        RoomStatus::Cleaning | RoomStatus::Maintenance | RoomStatus::DeepClean => {}
        status => {
            return Err(Error::InvalidTransition {
                room_id,
                status,
                action: "mark available",
            });
        }
    }

    let mut active: room::ActiveModel = room.into();
    active.status = Set(RoomStatus::Available);
    let updated = active.update(db).await?;
    info!(room_id, "Room '{}' is available", updated.name);
    Ok(updated)
}

/// Takes an available or cleaning room out of service.
///
/// # Errors
/// Returns a validation error if `status` is not Maintenance or Deep-clean, and
/// refuses rooms that are occupied or already out of service.
#[instrument(skip(db))]
pub async fn set_out_of_service(
    db: &DatabaseConnection,
    room_id: i64,
    status: RoomStatus,
) -> Result<room::Model> {
    if !matches!(status, RoomStatus::Maintenance | RoomStatus::DeepClean) {
        return Err(Error::Validation {
            message: format!("{status:?} is not an out-of-service status"),
        });
    }

    let room = load_room(db, room_id).await?;
    if !matches!(room.status, RoomStatus::Available | RoomStatus::Cleaning) {
        return Err(Error::InvalidTransition {
            room_id,
            status: room.status,
            action: "take out of service",
        });
    }

    let mut active: room::ActiveModel = room.into();
    active.status = Set(status);
    let updated = active.update(db).await?;
    info!(room_id, "Room '{}' set to {:?}", updated.name, status);
    Ok(updated)
}

/// Records how many remote controls the guest has.
///
/// # Errors
/// Returns `RoomNotFound` or a database error.
pub async fn update_controls(
    db: &DatabaseConnection,
    room_id: i64,
    counts: ControlCounts,
) -> Result<room::Model> {
    let room = load_room(db, room_id).await?;
    let mut active: room::ActiveModel = room.into();
    active.tv_controls = Set(counts.tv());
    active.ac_controls = Set(counts.ac());
    active.update(db).await.map_err(Into::into)
}
