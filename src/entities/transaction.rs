//! Transaction entity - The append-only financial ledger.
//!
//! Each transaction records one charge with its amount, `transaction_type`, the
//! wall-clock `timestamp`, and the `shift`/`operational_date` computed at the moment
//! it was written. Rows are never updated after insertion. Stay charges carry the
//! `stay_id` they belong to; employee sales have neither room nor stay.
use super::shift::Shift;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of charge a transaction records.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TransactionType {
    /// Price of the rate chosen at check-in
    #[sea_orm(string_value = "InitialStay")]
    InitialStay,
    /// Extension of an active stay
    #[sea_orm(string_value = "ExtraTime")]
    ExtraTime,
    /// Price difference of a package upgrade
    #[sea_orm(string_value = "PackageAdjustment")]
    PackageAdjustment,
    /// Fee for an additional guest
    #[sea_orm(string_value = "ExtraPerson")]
    ExtraPerson,
    /// Products consumed by the room
    #[sea_orm(string_value = "Consumption")]
    Consumption,
    /// Products sold to staff
    #[sea_orm(string_value = "EmployeeSale")]
    EmployeeSale,
}

impl TransactionType {
    /// Whether charges of this type accumulate into a room's `total_debt`.
    #[must_use]
    pub const fn is_stay_charge(self) -> bool {
        !matches!(self, Self::EmployeeSale)
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Room charged, None for employee sales
    pub room_id: Option<i64>,
    /// Stay the charge is attributed to, None for employee sales
    pub stay_id: Option<i64>,
    /// Employee the sale was made to
    pub employee_id: Option<i64>,
    /// Product sold, for consumption and employee sales
    pub product_id: Option<i64>,
    /// Charged amount
    pub amount: f64,
    /// Kind of charge
    pub transaction_type: TransactionType,
    /// Human-readable description of the charge
    pub description: String,
    /// When the transaction was recorded
    pub timestamp: DateTimeUtc,
    /// Shift in effect when recorded
    pub shift: Shift,
    /// Operational date in effect when recorded
    pub operational_date: Date,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stay charge belongs to one stay
    #[sea_orm(
        belongs_to = "super::stay::Entity",
        from = "Column::StayId",
        to = "super::stay::Column::Id"
    )]
    Stay,
    /// Each employee sale belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::stay::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stay.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
