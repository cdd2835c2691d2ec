//! Stay entity - One guest occupancy from check-in to release.
//!
//! The stay owns its ledger: every stay charge in `transactions` carries the
//! stay's id, so a room swap only has to move the stay, not the charges.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stay database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stays")]
pub struct Model {
    /// Unique identifier for the stay
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Room currently (or last) holding the stay
    pub room_id: i64,
    /// Guest name, if given
    pub customer_name: Option<String>,
    /// Licence plate of the guest's vehicle
    pub vehicle_plate: Option<String>,
    /// Start of the stay as entered at the desk
    pub check_in_time: DateTimeUtc,
    /// Clock instant the check-in was recorded
    pub opened_at: DateTimeUtc,
    /// When the room was released, None while active
    pub released_at: Option<DateTimeUtc>,
    /// Final debt of the stay, written on release
    pub total_charged: f64,
}

impl Model {
    /// Whether the stay is still running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.released_at.is_none()
    }
}

/// Defines relationships between Stay and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stay belongs to one room
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    /// One stay has many charges
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
