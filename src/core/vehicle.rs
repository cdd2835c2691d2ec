//! Vehicle history - Which vehicles are on the property and for which room.
//!
//! Records are opened at check-in, closed at release and re-pointed on a room
//! swap. The helpers are generic over the connection so lifecycle transitions can
//! run them inside their database transaction.

use crate::{
    entities::{VehicleHistory, vehicle_history},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Descriptors of a guest's vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleInfo {
    /// Licence plate
    pub plate: String,
    /// Make/model
    pub brand: Option<String>,
    /// Colour
    pub color: Option<String>,
}

impl VehicleInfo {
    /// Normalises the plate (trimmed, upper case) and drops empty descriptors.
    ///
    /// Returns `None` when no plate was entered.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let plate = self.plate.trim().to_uppercase();
        if plate.is_empty() {
            return None;
        }
        let clean = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };
        Some(Self {
            plate,
            brand: clean(&self.brand),
            color: clean(&self.color),
        })
    }
}

/// Opens a vehicle record for `room_id`.
pub async fn open_vehicle_record<C>(
    db: &C,
    room_id: i64,
    vehicle: &VehicleInfo,
    at: DateTime<Utc>,
) -> Result<vehicle_history::Model>
where
    C: ConnectionTrait,
{
    vehicle_history::ActiveModel {
        room_id: Set(room_id),
        plate: Set(vehicle.plate.clone()),
        brand: Set(vehicle.brand.clone()),
        color: Set(vehicle.color.clone()),
        check_in_time: Set(at),
        check_out_time: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Open records for a room, oldest first.
pub async fn open_records_for_room<C>(db: &C, room_id: i64) -> Result<Vec<vehicle_history::Model>>
where
    C: ConnectionTrait,
{
    VehicleHistory::find()
        .filter(vehicle_history::Column::RoomId.eq(room_id))
        .filter(vehicle_history::Column::CheckOutTime.is_null())
        .order_by_asc(vehicle_history::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Closes every open record of a room at `at`. Returns how many were closed.
pub async fn close_vehicle_records<C>(db: &C, room_id: i64, at: DateTime<Utc>) -> Result<usize>
where
    C: ConnectionTrait,
{
    let open = open_records_for_room(db, room_id).await?;
    let closed = open.len();
    for record in open {
        let mut record: vehicle_history::ActiveModel = record.into();
        record.check_out_time = Set(Some(at));
        record.update(db).await?;
    }
    Ok(closed)
}

/// Moves every open record of `from_room` to `to_room`, keeping its entry time.
pub async fn repoint_vehicle_records<C>(db: &C, from_room: i64, to_room: i64) -> Result<usize>
where
    C: ConnectionTrait,
{
    let open = open_records_for_room(db, from_room).await?;
    let moved = open.len();
    for record in open {
        let mut record: vehicle_history::ActiveModel = record.into();
        record.room_id = Set(to_room);
        record.update(db).await?;
    }
    Ok(moved)
}

/// Every vehicle currently on the property.
pub async fn get_open_vehicles(db: &DatabaseConnection) -> Result<Vec<vehicle_history::Model>> {
    VehicleHistory::find()
        .filter(vehicle_history::Column::CheckOutTime.is_null())
        .order_by_asc(vehicle_history::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every visit of a plate, newest first.
///
/// # Errors
/// Returns a validation error for an empty plate.
pub async fn get_history_for_plate(
    db: &DatabaseConnection,
    plate: &str,
) -> Result<Vec<vehicle_history::Model>> {
    let plate = plate.trim().to_uppercase();
    if plate.is_empty() {
        return Err(Error::Validation {
            message: "Plate cannot be empty".to_string(),
        });
    }
    VehicleHistory::find()
        .filter(vehicle_history::Column::Plate.eq(plate))
        .order_by_desc(vehicle_history::Column::CheckInTime)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_vehicle_info_normalized() {
        let info = VehicleInfo {
            plate: "  abc-123 ".to_string(),
            brand: Some("  ".to_string()),
            color: Some(" Rojo ".to_string()),
        };
        let normalized = info.normalized().unwrap();
        assert_eq!(normalized.plate, "ABC-123");
        assert_eq!(normalized.brand, None);
        assert_eq!(normalized.color.as_deref(), Some("Rojo"));

        assert!(VehicleInfo::default().normalized().is_none());
    }

    #[tokio::test]
    async fn test_open_close_and_repoint() -> Result<()> {
        let fixture = setup_with_room().await?;
        let other = create_test_room(&fixture.db, "102", fixture.room_type.id).await?;
        let now = fixture.clock.now();
        let vehicle = test_vehicle();

        open_vehicle_record(&fixture.db, fixture.room.id, &vehicle, now).await?;
        assert_eq!(get_open_vehicles(&fixture.db).await?.len(), 1);

        let moved = repoint_vehicle_records(&fixture.db, fixture.room.id, other.id).await?;
        assert_eq!(moved, 1);
        assert!(open_records_for_room(&fixture.db, fixture.room.id).await?.is_empty());

        let closed = close_vehicle_records(&fixture.db, other.id, now).await?;
        assert_eq!(closed, 1);
        assert!(get_open_vehicles(&fixture.db).await?.is_empty());

        let history = get_history_for_plate(&fixture.db, "abc-123").await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].room_id, other.id);
        assert_eq!(history[0].check_out_time, Some(now));
        Ok(())
    }
}
