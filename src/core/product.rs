//! Product business logic - The room service menu and its stock.
//!
//! Products are sold to rooms or to staff through [`crate::core::billing`], which
//! decrements stock inside the sale's database transaction. This module covers the
//! catalog itself: creating, editing, restocking and soft deleting items.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Fields an operator enters for a menu item.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    /// Display name
    pub name: String,
    /// Unit price, zero allowed
    pub price: f64,
    /// Menu category
    pub category: String,
}

impl ProductInput {
    fn validated(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation {
                message: "Product name cannot be empty".to_string(),
            });
        }
        if self.price < 0.0 || !self.price.is_finite() {
            return Err(Error::InvalidAmount { amount: self.price });
        }
        let category = self.category.trim();
        let category = if category.is_empty() {
            "General".to_string()
        } else {
            category.to_string()
        };
        Ok(Self {
            name,
            price: self.price,
            category,
        })
    }
}

/// Retrieves all active (non-deleted) products, ordered by category then name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Category)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active product by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Name.eq(name))
        .filter(product::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by id, deleted or not.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn load_active(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Adds an item to the menu with its opening stock.
///
/// # Errors
/// Returns an error if the name is empty, the price is negative or not finite,
/// the stock is negative, or the insert fails.
pub async fn create_product(
    db: &DatabaseConnection,
    input: ProductInput,
    stock: i32,
) -> Result<product::Model> {
    let input = input.validated()?;
    if stock < 0 {
        return Err(Error::Validation {
            message: format!("Stock cannot be negative, got {stock}"),
        });
    }

    let now = chrono::Utc::now().naive_utc();
    let model = product::ActiveModel {
        name: Set(input.name),
        price: Set(input.price),
        stock: Set(stock),
        category: Set(input.category),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(product_id = model.id, "Created product '{}'", model.name);
    Ok(model)
}

/// Updates an item's name, price and category. Stock is left alone.
///
/// # Errors
/// Returns an error if the input is invalid, the product does not exist or is
/// deleted, or the update fails.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    input: ProductInput,
) -> Result<product::Model> {
    let input = input.validated()?;
    let mut product: product::ActiveModel = load_active(db, product_id).await?.into();

    product.name = Set(input.name);
    product.price = Set(input.price);
    product.category = Set(input.category);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Adds received units to an item's stock.
///
/// # Errors
/// Returns an error if `quantity` is below 1, the product does not exist or is
/// deleted, or the update fails.
pub async fn restock_product(
    db: &DatabaseConnection,
    product_id: i64,
    quantity: i32,
) -> Result<product::Model> {
    if quantity < 1 {
        return Err(Error::Validation {
            message: format!("Restock quantity must be at least 1, got {quantity}"),
        });
    }
    let product = load_active(db, product_id).await?;
    let stock = product.stock + quantity;

    let mut active: product::ActiveModel = product.into();
    active.stock = Set(stock);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(db).await?;
    info!(product_id, stock, "Restocked '{}'", updated.name);
    Ok(updated)
}

/// Soft deletes a product, keeping it for past transactions.
///
/// # Errors
/// Returns an error if the product does not exist or is already deleted, or the
/// update fails.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = load_active(db, product_id).await?.into();

    product.is_deleted = Set(true);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn input(name: &str, price: f64, category: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price,
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_product(&db, input("   ", 10.0, "Bebidas"), 5).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_product(&db, input("Refresco", -10.0, "Bebidas"), 5).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -10.0 })));

        let result = create_product(&db, input("Refresco", f64::NAN, "Bebidas"), 5).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_product(&db, input("Refresco", 10.0, "Bebidas"), -1).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(get_all_active_products(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_find_product() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_product(&db, input(" Cerveza ", 45.0, ""), 12).await?;
        assert_eq!(product.name, "Cerveza");
        assert_eq!(product.category, "General");
        assert_eq!(product.stock, 12);
        assert!(!product.is_deleted);

        let found = get_product_by_name(&db, "Cerveza").await?.unwrap();
        assert_eq!(found.id, product.id);
        assert!(get_product_by_name(&db, "Vino").await?.is_none());
        assert!(get_product_by_id(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_active_products_ordered_by_category() -> Result<()> {
        let db = setup_test_db().await?;
        let snack = create_product(&db, input("Papas", 20.0, "Snacks"), 5).await?;
        let soda = create_product(&db, input("Refresco", 25.0, "Bebidas"), 5).await?;
        let beer = create_product(&db, input("Cerveza", 45.0, "Bebidas"), 5).await?;

        let products = get_all_active_products(&db).await?;
        assert_eq!(products, vec![beer, soda, snack]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_restock_product() -> Result<()> {
        let fixture = setup_with_room().await?;
        let id = fixture.product.id;

        let updated = update_product(&fixture.db, id, input("Refresco 600ml", 28.0, "Bebidas")).await?;
        assert_eq!(updated.name, "Refresco 600ml");
        assert_eq!(updated.price, 28.0);
        assert_eq!(updated.stock, 10);

        let restocked = restock_product(&fixture.db, id, 6).await?;
        assert_eq!(restocked.stock, 16);

        let result = restock_product(&fixture.db, id, 0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_hides_it() -> Result<()> {
        let fixture = setup_with_room().await?;
        let id = fixture.product.id;

        let deleted = delete_product(&fixture.db, id).await?;
        assert!(deleted.is_deleted);
        assert!(get_all_active_products(&fixture.db).await?.is_empty());
        assert!(get_product_by_id(&fixture.db, id).await?.is_some());

        let result = delete_product(&fixture.db, id).await;
        assert!(matches!(result, Err(Error::ProductNotFound { .. })));

        let result = restock_product(&fixture.db, id, 1).await;
        assert!(matches!(result, Err(Error::ProductNotFound { .. })));
        Ok(())
    }
}
