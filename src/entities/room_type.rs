//! Room type entity - Groups rooms into pricing tiers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room_types")]
pub struct Model {
    /// Unique identifier for the room type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Sencilla", "Jacuzzi")
    pub name: String,
}

/// Defines relationships between `RoomType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One room type classifies many rooms
    #[sea_orm(has_many = "super::room::Entity")]
    Rooms,
    /// One room type has many rates
    #[sea_orm(has_many = "super::rate::Entity")]
    Rates,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl Related<super::rate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
