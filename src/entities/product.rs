//! Product entity - Items on the room service menu.
//!
//! Products are sold to rooms as consumption or to staff as employee sales.
//! Each sale decrements `stock`. Deleted products are hidden but kept so past
//! transactions still resolve.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Refresco", "Cerveza")
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Units on hand
    pub stock: i32,
    /// Menu category (e.g., "Bebidas", "Snacks")
    pub category: String,
    /// Soft delete flag - if true, product is hidden but data is preserved
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// `Product` is referenced by transactions through a plain id column
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
