//! Expenses - Cash paid out of the drawer.
//!
//! The shift and operational date are computed from the expense's own instant
//! when it is recorded and never recomputed, same as transactions.

use crate::{
    core::shift::ShiftClock,
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Records an expense that happened at `at`.
///
/// # Errors
/// Returns a validation error for an empty description, `InvalidAmount` for a
/// non-positive or non-finite amount, or a database error.
#[instrument(skip(db, clock))]
pub async fn record_expense(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    description: &str,
    amount: f64,
    at: DateTime<Utc>,
) -> Result<expense::Model> {
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::Validation {
            message: "Expense description cannot be empty".to_string(),
        });
    }
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    let info = clock.info(at);
    let model = expense::ActiveModel {
        description: Set(description.to_string()),
        amount: Set(amount),
        date: Set(at),
        shift: Set(info.shift),
        operational_date: Set(info.operational_date),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        expense_id = model.id,
        amount,
        shift = model.shift.label(),
        "Recorded expense"
    );
    Ok(model)
}

/// Every expense ordered by id.
pub async fn get_all_expenses(db: &DatabaseConnection) -> Result<Vec<expense::Model>> {
    Expense::find()
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes an expense entered by mistake.
///
/// # Errors
/// Returns `ExpenseNotFound` or a database error.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    let result = Expense::delete_by_id(expense_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ExpenseNotFound { id: expense_id });
    }
    info!(expense_id, "Deleted expense");
    Ok(())
}
