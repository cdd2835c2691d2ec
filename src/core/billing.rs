//! Billing - The transaction ledger and the room debt cache.
//!
//! Every charge is appended to `transactions` stamped with the shift and
//! operational date in effect when it was recorded. Stay charges also bump the
//! room's `total_debt` by the same amount inside the same database transaction,
//! so the cache and the ledger never drift apart from the caller's point of view.
//! [`reconcile_room`] recomputes the ledger and compares it with the cache.

use crate::{
    core::{room::get_room_by_id, shift::ShiftClock, stay::get_active_stay},
    entities::{
        Employee, EmployeeStatus, Product, Room, RoomStatus, Transaction, TransactionType, product,
        room, transaction,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Tolerance used when comparing the cached debt with the ledger.
const DEBT_EPSILON: f64 = 0.005;

/// A charge about to be written to the ledger.
#[derive(Debug, Clone)]
pub struct Charge {
    /// Kind of charge
    pub transaction_type: TransactionType,
    /// Amount charged, must be positive
    pub amount: f64,
    /// Human-readable description
    pub description: String,
    /// Room charged
    pub room_id: Option<i64>,
    /// Stay the charge belongs to
    pub stay_id: Option<i64>,
    /// Employee buying, for employee sales
    pub employee_id: Option<i64>,
    /// Product sold
    pub product_id: Option<i64>,
}

impl Charge {
    /// A charge against a running stay.
    #[must_use]
    pub fn for_stay(
        transaction_type: TransactionType,
        amount: f64,
        description: impl Into<String>,
        room_id: i64,
        stay_id: i64,
    ) -> Self {
        Self {
            transaction_type,
            amount,
            description: description.into(),
            room_id: Some(room_id),
            stay_id: Some(stay_id),
            employee_id: None,
            product_id: None,
        }
    }
}

/// Rejects zero, negative and non-finite charge amounts.
pub(crate) fn validate_charge_amount(amount: f64) -> Result<()> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Appends a charge to the ledger, stamped with the current shift.
///
/// Does not touch `total_debt`; stay transitions pair this with
/// [`increment_room_debt_atomic`] inside one database transaction.
pub async fn append_charge<C>(
    db: &C,
    clock: &ShiftClock,
    charge: Charge,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    validate_charge_amount(charge.amount)?;

    let now = clock.now();
    let info = clock.info(now);

    let model = transaction::ActiveModel {
        room_id: Set(charge.room_id),
        stay_id: Set(charge.stay_id),
        employee_id: Set(charge.employee_id),
        product_id: Set(charge.product_id),
        amount: Set(charge.amount),
        transaction_type: Set(charge.transaction_type),
        description: Set(charge.description),
        timestamp: Set(now),
        shift: Set(info.shift),
        operational_date: Set(info.operational_date),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        transaction_id = model.id,
        amount = model.amount,
        shift = model.shift.label(),
        "Recorded {:?} charge",
        model.transaction_type
    );
    Ok(model)
}

/// Atomically adds `amount_delta` to a room's `total_debt`.
pub async fn increment_room_debt_atomic<C>(
    db: &C,
    room_id: i64,
    amount_delta: f64,
) -> Result<room::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    Room::update_many()
        .col_expr(
            room::Column::TotalDebt,
            Expr::col(room::Column::TotalDebt).add(amount_delta),
        )
        .filter(room::Column::Id.eq(room_id))
        .exec(db)
        .await?;

    get_room_by_id(db, room_id)
        .await?
        .ok_or(Error::RoomNotFound { id: room_id })
}

/// Every transaction ordered by id.
pub async fn get_all_transactions(db: &DatabaseConnection) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Charges attributed to a stay, oldest first.
pub async fn get_transactions_for_stay<C>(db: &C, stay_id: i64) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::StayId.eq(stay_id))
        .order_by_asc(transaction::Column::Timestamp)
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Charges recorded against a room across all its stays, newest first.
pub async fn get_transactions_for_room(
    db: &DatabaseConnection,
    room_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::RoomId.eq(room_id))
        .order_by_desc(transaction::Column::Timestamp)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums the stay charges of `stay_id` recorded within `[from, until]`.
#[must_use]
pub fn stay_ledger_total(
    entries: &[transaction::Model],
    stay_id: i64,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> f64 {
    entries
        .iter()
        .filter(|t| t.stay_id == Some(stay_id))
        .filter(|t| t.transaction_type.is_stay_charge())
        .filter(|t| t.timestamp >= from && t.timestamp <= until)
        .map(|t| t.amount)
        .sum()
}

/// Outcome of comparing a room's cached debt with its ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Room checked
    pub room_id: i64,
    /// Stay checked, None when the room is not occupied
    pub stay_id: Option<i64>,
    /// `total_debt` stored on the room
    pub cached: f64,
    /// Sum of the stay's ledger
    pub ledger: f64,
}

impl Reconciliation {
    /// Cached minus ledger.
    #[must_use]
    pub fn difference(&self) -> f64 {
        self.cached - self.ledger
    }

    /// Whether cache and ledger agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.difference().abs() < DEBT_EPSILON
    }
}

/// Recomputes a room's debt from its stay ledger and compares it with the cache.
///
/// A room without a running stay must carry a zero debt.
///
/// # Errors
/// Returns `RoomNotFound` or a database error.
pub async fn reconcile_room(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    room_id: i64,
) -> Result<Reconciliation> {
    let room = get_room_by_id(db, room_id)
        .await?
        .ok_or(Error::RoomNotFound { id: room_id })?;

    let stay = if room.is_occupied() {
        get_active_stay(db, room_id).await?
    } else {
        None
    };

    let ledger = match &stay {
        Some(stay) => {
            let entries = get_transactions_for_stay(db, stay.id).await?;
            stay_ledger_total(&entries, stay.id, stay.opened_at, clock.now())
        }
        None => 0.0,
    };

    Ok(Reconciliation {
        room_id,
        stay_id: stay.map(|s| s.id),
        cached: room.total_debt,
        ledger,
    })
}

/// Reconciles every occupied room and returns the ones that disagree.
pub async fn audit_open_stays(
    db: &DatabaseConnection,
    clock: &ShiftClock,
) -> Result<Vec<Reconciliation>> {
    let occupied = Room::find()
        .filter(room::Column::Status.eq(RoomStatus::Occupied))
        .order_by_asc(room::Column::Id)
        .all(db)
        .await?;

    let mut mismatches = Vec::new();
    for room in occupied {
        let check = reconcile_room(db, clock, room.id).await?;
        if !check.is_consistent() {
            warn!(
                room_id = check.room_id,
                cached = check.cached,
                ledger = check.ledger,
                "Room debt does not match its ledger"
            );
            mismatches.push(check);
        }
    }
    Ok(mismatches)
}

async fn take_stock<C>(db: &C, product_id: i64, quantity: i32) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if quantity < 1 {
        return Err(Error::Validation {
            message: format!("Quantity must be at least 1, got {quantity}"),
        });
    }

    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProductNotFound { id: product_id })?;

    if product.stock < quantity {
        return Err(Error::InsufficientStock {
            product_id,
            available: product.stock,
            requested: quantity,
        });
    }

    let mut active: product::ActiveModel = product.clone().into();
    active.stock = Set(product.stock - quantity);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Sells products to an occupied room as consumption.
///
/// Decrements stock, appends a Consumption charge for `price × quantity` and adds
/// it to the room's debt, all in one database transaction.
///
/// # Errors
/// Returns an error if the room is not occupied, the product is unknown or short
/// on stock, the quantity is below 1, or a write fails.
#[instrument(skip(db, clock))]
pub async fn sell_to_room(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    room_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;

    let room = get_room_by_id(&txn, room_id)
        .await?
        .ok_or(Error::RoomNotFound { id: room_id })?;
    if !room.is_occupied() {
        return Err(Error::InvalidTransition {
            room_id,
            status: room.status,
            action: "record consumption",
        });
    }
    let stay = get_active_stay(&txn, room_id)
        .await?
        .ok_or(Error::InvalidTransition {
            room_id,
            status: room.status,
            action: "record consumption without a stay",
        })?;

    let product = take_stock(&txn, product_id, quantity).await?;
    let amount = product.price * f64::from(quantity);

    let mut charge = Charge::for_stay(
        TransactionType::Consumption,
        amount,
        format!("{quantity}x {}", product.name),
        room_id,
        stay.id,
    );
    charge.product_id = Some(product_id);

    let recorded = append_charge(&txn, clock, charge).await?;
    increment_room_debt_atomic(&txn, room_id, amount).await?;

    txn.commit().await?;
    Ok(recorded)
}

/// Sells products to an active employee.
///
/// Decrements stock and appends an Employee Sale with no room attached.
///
/// # Errors
/// Returns an error if the employee is unknown or inactive, the product is
/// unknown or short on stock, the quantity is below 1, or a write fails.
#[instrument(skip(db, clock))]
pub async fn sell_to_employee(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    employee_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;

    let employee = Employee::find_by_id(employee_id)
        .one(&txn)
        .await?
        .ok_or(Error::EmployeeNotFound { id: employee_id })?;
    if employee.status != EmployeeStatus::Active {
        return Err(Error::EmployeeInactive { id: employee_id });
    }

    let product = take_stock(&txn, product_id, quantity).await?;
    let recorded = append_charge(
        &txn,
        clock,
        Charge {
            transaction_type: TransactionType::EmployeeSale,
            amount: product.price * f64::from(quantity),
            description: format!("{quantity}x {} ({})", product.name, employee.name),
            room_id: None,
            stay_id: None,
            employee_id: Some(employee_id),
            product_id: Some(product_id),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(recorded)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{employee, room};
    use crate::test_utils::*;

    #[test]
    fn test_validate_charge_amount() {
        assert!(validate_charge_amount(10.0).is_ok());
        assert!(matches!(
            validate_charge_amount(0.0),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            validate_charge_amount(-5.0),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            validate_charge_amount(f64::INFINITY),
            Err(Error::InvalidAmount { .. })
        ));
    }

    #[tokio::test]
    async fn test_append_charge_freezes_shift() -> Result<()> {
        let fixture = setup_with_room().await?;
        let stay = check_in_standard(&fixture).await?;

        let recorded = append_charge(
            &fixture.db,
            &fixture.shift_clock,
            Charge::for_stay(
                TransactionType::ExtraPerson,
                100.0,
                "Persona extra",
                fixture.room.id,
                stay.id,
            ),
        )
        .await?;

        let expected = fixture.shift_clock.now_info();
        assert_eq!(recorded.shift, expected.shift);
        assert_eq!(recorded.operational_date, expected.operational_date);
        assert_eq!(recorded.timestamp, fixture.shift_clock.now());
        Ok(())
    }

    #[tokio::test]
    async fn test_stay_ledger_total_window_and_types() -> Result<()> {
        let fixture = setup_with_room().await?;
        let stay = check_in_standard(&fixture).await?;
        let opened = fixture.clock.now();

        fixture.clock.advance(chrono::Duration::hours(1));
        sell_to_room(&fixture.db, &fixture.shift_clock, fixture.room.id, fixture.product.id, 2)
            .await?;

        let entries = get_transactions_for_stay(&fixture.db, stay.id).await?;
        assert_eq!(entries.len(), 2);

        let full = stay_ledger_total(&entries, stay.id, opened, fixture.clock.now());
        assert_eq!(full, 330.0 + 50.0);

        let before_sale = stay_ledger_total(
            &entries,
            stay.id,
            opened,
            opened + chrono::Duration::minutes(30),
        );
        assert_eq!(before_sale, 330.0);

        assert_eq!(stay_ledger_total(&entries, stay.id + 1, opened, fixture.clock.now()), 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_sell_to_room_updates_debt_and_stock() -> Result<()> {
        let fixture = setup_with_room().await?;
        check_in_standard(&fixture).await?;

        let sale =
            sell_to_room(&fixture.db, &fixture.shift_clock, fixture.room.id, fixture.product.id, 3)
                .await?;
        assert_eq!(sale.transaction_type, TransactionType::Consumption);
        assert_eq!(sale.amount, 75.0);
        assert_eq!(sale.product_id, Some(fixture.product.id));

        let room = room::get_room_by_id(&fixture.db, fixture.room.id)
            .await?
            .unwrap();
        assert_eq!(room.total_debt, 405.0);

        let product = Product::find_by_id(fixture.product.id)
            .one(&fixture.db)
            .await?
            .unwrap();
        assert_eq!(product.stock, 7);

        let check = reconcile_room(&fixture.db, &fixture.shift_clock, fixture.room.id).await?;
        assert!(check.is_consistent());
        Ok(())
    }

    #[tokio::test]
    async fn test_sell_to_room_refuses_without_stay_or_stock() -> Result<()> {
        let fixture = setup_with_room().await?;

        let result =
            sell_to_room(&fixture.db, &fixture.shift_clock, fixture.room.id, fixture.product.id, 1)
                .await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));

        check_in_standard(&fixture).await?;
        let result =
            sell_to_room(&fixture.db, &fixture.shift_clock, fixture.room.id, fixture.product.id, 11)
                .await;
        assert!(matches!(
            result,
            Err(Error::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            })
        ));

        let result =
            sell_to_room(&fixture.db, &fixture.shift_clock, fixture.room.id, fixture.product.id, 0)
                .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let room = room::get_room_by_id(&fixture.db, fixture.room.id)
            .await?
            .unwrap();
        assert_eq!(room.total_debt, 330.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_sell_to_employee() -> Result<()> {
        let fixture = setup_with_room().await?;
        let worker = employee::create_employee(&fixture.db, "Lucía", "Recepción").await?;

        let sale = sell_to_employee(
            &fixture.db,
            &fixture.shift_clock,
            worker.id,
            fixture.product.id,
            2,
        )
        .await?;
        assert_eq!(sale.transaction_type, TransactionType::EmployeeSale);
        assert_eq!(sale.room_id, None);
        assert_eq!(sale.stay_id, None);
        assert_eq!(sale.employee_id, Some(worker.id));
        assert_eq!(sale.amount, 50.0);

        employee::set_employee_status(&fixture.db, worker.id, EmployeeStatus::Inactive).await?;
        let result = sell_to_employee(
            &fixture.db,
            &fixture.shift_clock,
            worker.id,
            fixture.product.id,
            1,
        )
        .await;
        assert!(matches!(result, Err(Error::EmployeeInactive { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_audit_detects_tampered_debt() -> Result<()> {
        let fixture = setup_with_room().await?;
        check_in_standard(&fixture).await?;

        assert!(audit_open_stays(&fixture.db, &fixture.shift_clock).await?.is_empty());

        increment_room_debt_atomic(&fixture.db, fixture.room.id, 12.5).await?;
        let mismatches = audit_open_stays(&fixture.db, &fixture.shift_clock).await?;
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].difference(), 12.5);
        Ok(())
    }
}
