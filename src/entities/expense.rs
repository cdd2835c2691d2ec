//! Expense entity - Cash paid out of the front desk drawer.
//!
//! Like transactions, expenses freeze the shift and operational date at write time.

use super::shift::Shift;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What the money was spent on
    pub description: String,
    /// Amount paid out
    pub amount: f64,
    /// When the expense happened
    pub date: DateTimeUtc,
    /// Shift in effect at `date`
    pub shift: Shift,
    /// Operational date in effect at `date`
    pub operational_date: Date,
}

/// `Expense` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
