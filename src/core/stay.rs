//! Stay records - One row per occupancy, opened at check-in and closed at release.

use crate::{
    entities::{Stay, stay},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// The running stay of a room, if any.
pub async fn get_active_stay<C>(db: &C, room_id: i64) -> Result<Option<stay::Model>>
where
    C: ConnectionTrait,
{
    Stay::find()
        .filter(stay::Column::RoomId.eq(room_id))
        .filter(stay::Column::ReleasedAt.is_null())
        .order_by_desc(stay::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Every stay ordered by id.
pub async fn get_all_stays(db: &DatabaseConnection) -> Result<Vec<stay::Model>> {
    Stay::find()
        .order_by_asc(stay::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Stays held by a room, newest first.
pub async fn get_stays_for_room(db: &DatabaseConnection, room_id: i64) -> Result<Vec<stay::Model>> {
    Stay::find()
        .filter(stay::Column::RoomId.eq(room_id))
        .order_by_desc(stay::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub(crate) async fn open_stay<C>(
    db: &C,
    room_id: i64,
    customer_name: Option<String>,
    vehicle_plate: Option<String>,
    check_in_time: DateTime<Utc>,
    opened_at: DateTime<Utc>,
) -> Result<stay::Model>
where
    C: ConnectionTrait,
{
    stay::ActiveModel {
        room_id: Set(room_id),
        customer_name: Set(customer_name),
        vehicle_plate: Set(vehicle_plate),
        check_in_time: Set(check_in_time),
        opened_at: Set(opened_at),
        released_at: Set(None),
        total_charged: Set(0.0),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub(crate) async fn close_stay<C>(
    db: &C,
    stay: stay::Model,
    released_at: DateTime<Utc>,
    total_charged: f64,
) -> Result<stay::Model>
where
    C: ConnectionTrait,
{
    let mut stay: stay::ActiveModel = stay.into();
    stay.released_at = Set(Some(released_at));
    stay.total_charged = Set(total_charged);
    stay.update(db).await.map_err(Into::into)
}

pub(crate) async fn move_stay<C>(db: &C, stay: stay::Model, to_room: i64) -> Result<stay::Model>
where
    C: ConnectionTrait,
{
    let mut stay: stay::ActiveModel = stay.into();
    stay.room_id = Set(to_room);
    stay.update(db).await.map_err(Into::into)
}
