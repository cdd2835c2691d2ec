//! Employee entity - Front desk staff accounts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether an employee can currently work and buy from the menu.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EmployeeStatus {
    /// Currently employed
    #[sea_orm(string_value = "Active")]
    Active,
    /// No longer working
    #[sea_orm(string_value = "Inactive")]
    Inactive,
}

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Job role (e.g., "Recepción", "Camarista")
    pub role: String,
    /// Employment status
    pub status: EmployeeStatus,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee has many purchases
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
