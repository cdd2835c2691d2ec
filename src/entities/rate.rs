//! Rate entity - A pricing package for a room type.
//!
//! Regular rates are offered at check-in and as package upgrades. Rates flagged
//! `is_extra_hour` are supplementary extensions and never offered as a primary rate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rate database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rates")]
pub struct Model {
    /// Unique identifier for the rate
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "8 horas", "Hora extra")
    pub name: String,
    /// Stay duration granted by this rate
    pub hours: i32,
    /// Price charged for the rate
    pub price: f64,
    /// Room type this rate applies to
    pub room_type_id: i64,
    /// Marks extension rates excluded from check-in selection
    pub is_extra_hour: bool,
}

/// Defines relationships between Rate and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rate belongs to one room type
    #[sea_orm(
        belongs_to = "super::room_type::Entity",
        from = "Column::RoomTypeId",
        to = "super::room_type::Column::Id"
    )]
    RoomType,
}

impl Related<super::room_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
