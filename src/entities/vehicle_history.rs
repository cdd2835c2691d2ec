//! Vehicle history entity - Vehicles on the property.
//!
//! A record stays open (`check_out_time` is None) while the stay it belongs to is
//! active. Release closes it; a room swap moves it to the new room.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vehicle history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_history")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Room the vehicle's guest occupies
    pub room_id: i64,
    /// Licence plate
    pub plate: String,
    /// Vehicle make/model
    pub brand: Option<String>,
    /// Vehicle colour
    pub color: Option<String>,
    /// When the vehicle entered
    pub check_in_time: DateTimeUtc,
    /// When the vehicle left, None while on the property
    pub check_out_time: Option<DateTimeUtc>,
}

/// Defines relationships between `VehicleHistory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one room
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
