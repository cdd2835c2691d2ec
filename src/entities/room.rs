//! Room entity - The fixed room inventory and the state of the current stay.
//!
//! Occupancy fields (`check_in_time`, `check_out_time`, `rate_id`, `total_debt`,
//! customer and vehicle descriptors) are only populated while the room is
//! `Occupied`. `total_debt` is a cache of the stay's ledger and is adjusted by
//! every lifecycle transition that appends a charge.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Occupancy status of a room.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RoomStatus {
    /// Clean and ready for check-in
    #[sea_orm(string_value = "Available")]
    Available,
    /// A stay is active
    #[sea_orm(string_value = "Occupied")]
    Occupied,
    /// Released, waiting for housekeeping
    #[sea_orm(string_value = "Cleaning")]
    Cleaning,
    /// Out of service for repairs
    #[sea_orm(string_value = "Maintenance")]
    Maintenance,
    /// Out of service for a deep clean
    #[sea_orm(string_value = "DeepClean")]
    DeepClean,
}

/// Room database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    /// Unique identifier for the room
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "101")
    pub name: String,
    /// Current occupancy status
    pub status: RoomStatus,
    /// Pricing tier of the room
    pub room_type_id: i64,
    /// Start of the active stay
    pub check_in_time: Option<DateTimeUtc>,
    /// Scheduled end of the active stay
    pub check_out_time: Option<DateTimeUtc>,
    /// Active pricing package
    pub rate_id: Option<i64>,
    /// Charges accumulated by the active stay
    pub total_debt: f64,
    /// Guests in the room
    pub persons: i32,
    /// TV remotes loaned to the guest (0-2)
    pub tv_controls: i32,
    /// A/C remotes loaned to the guest (0-2)
    pub ac_controls: i32,
    /// Guest name, if given
    pub customer_name: Option<String>,
    /// Licence plate of the guest's vehicle
    pub vehicle_plate: Option<String>,
    /// Vehicle make/model
    pub vehicle_brand: Option<String>,
    /// Vehicle colour
    pub vehicle_color: Option<String>,
}

impl Model {
    /// Whether a stay is currently active in this room.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.status == RoomStatus::Occupied
    }
}

/// Defines relationships between Room and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each room belongs to one room type
    #[sea_orm(
        belongs_to = "super::room_type::Entity",
        from = "Column::RoomTypeId",
        to = "super::room_type::Column::Id"
    )]
    RoomType,
    /// One room has many stays over its lifetime
    #[sea_orm(has_many = "super::stay::Entity")]
    Stays,
}

impl Related<super::room_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomType.def()
    }
}

impl Related<super::stay::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stays.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
