//! Table snapshot cache.
//!
//! Each front desk terminal keeps an in-memory copy of every table. A change
//! notification for a table only marks it stale; the refresher task re-selects
//! every stale table once. Notifications that arrive before the refetch runs
//! collapse into that single refetch.

use crate::{
    core::consultant::MotelSnapshot,
    entities::{
        Employee, Expense, Product, Rate, Room, RoomType, Stay, Transaction, VehicleHistory,
        employee, expense, product, rate, room, room_type, stay, transaction, vehicle_history,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::{
    collections::BTreeSet,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::{Notify, RwLock, RwLockReadGuard, watch};
use tracing::{debug, error, info};

/// Tables mirrored in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    /// `rooms`
    Rooms,
    /// `room_types`
    RoomTypes,
    /// `rates`
    Rates,
    /// `stays`
    Stays,
    /// `transactions`
    Transactions,
    /// `expenses`
    Expenses,
    /// `vehicle_history`
    VehicleHistory,
    /// `products`
    Products,
    /// `employees`
    Employees,
}

impl Table {
    /// Every mirrored table.
    pub const ALL: [Self; 9] = [
        Self::Rooms,
        Self::RoomTypes,
        Self::Rates,
        Self::Stays,
        Self::Transactions,
        Self::Expenses,
        Self::VehicleHistory,
        Self::Products,
        Self::Employees,
    ];

    /// Database table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rooms => "rooms",
            Self::RoomTypes => "room_types",
            Self::Rates => "rates",
            Self::Stays => "stays",
            Self::Transactions => "transactions",
            Self::Expenses => "expenses",
            Self::VehicleHistory => "vehicle_history",
            Self::Products => "products",
            Self::Employees => "employees",
        }
    }

    /// Looks a table up by its database name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// In-memory copy of every table, each ordered by id.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Rooms
    pub rooms: Vec<room::Model>,
    /// Room types
    pub room_types: Vec<room_type::Model>,
    /// Rates
    pub rates: Vec<rate::Model>,
    /// Stays
    pub stays: Vec<stay::Model>,
    /// Ledger entries
    pub transactions: Vec<transaction::Model>,
    /// Expenses
    pub expenses: Vec<expense::Model>,
    /// Vehicle records
    pub vehicle_history: Vec<vehicle_history::Model>,
    /// Products, including deleted ones
    pub products: Vec<product::Model>,
    /// Employees
    pub employees: Vec<employee::Model>,
}

enum Rows {
    Rooms(Vec<room::Model>),
    RoomTypes(Vec<room_type::Model>),
    Rates(Vec<rate::Model>),
    Stays(Vec<stay::Model>),
    Transactions(Vec<transaction::Model>),
    Expenses(Vec<expense::Model>),
    VehicleHistory(Vec<vehicle_history::Model>),
    Products(Vec<product::Model>),
    Employees(Vec<employee::Model>),
}

async fn select_all(db: &DatabaseConnection, table: Table) -> Result<Rows> {
    Ok(match table {
        Table::Rooms => Rows::Rooms(Room::find().order_by_asc(room::Column::Id).all(db).await?),
        Table::RoomTypes => Rows::RoomTypes(
            RoomType::find()
                .order_by_asc(room_type::Column::Id)
                .all(db)
                .await?,
        ),
        Table::Rates => Rows::Rates(Rate::find().order_by_asc(rate::Column::Id).all(db).await?),
        Table::Stays => Rows::Stays(Stay::find().order_by_asc(stay::Column::Id).all(db).await?),
        Table::Transactions => Rows::Transactions(
            Transaction::find()
                .order_by_asc(transaction::Column::Id)
                .all(db)
                .await?,
        ),
        Table::Expenses => Rows::Expenses(
            Expense::find()
                .order_by_asc(expense::Column::Id)
                .all(db)
                .await?,
        ),
        Table::VehicleHistory => Rows::VehicleHistory(
            VehicleHistory::find()
                .order_by_asc(vehicle_history::Column::Id)
                .all(db)
                .await?,
        ),
        Table::Products => Rows::Products(
            Product::find()
                .order_by_asc(product::Column::Id)
                .all(db)
                .await?,
        ),
        Table::Employees => Rows::Employees(
            Employee::find()
                .order_by_asc(employee::Column::Id)
                .all(db)
                .await?,
        ),
    })
}

impl Snapshot {
    fn replace(&mut self, rows: Rows) -> usize {
        match rows {
            Rows::Rooms(v) => replace_len(&mut self.rooms, v),
            Rows::RoomTypes(v) => replace_len(&mut self.room_types, v),
            Rows::Rates(v) => replace_len(&mut self.rates, v),
            Rows::Stays(v) => replace_len(&mut self.stays, v),
            Rows::Transactions(v) => replace_len(&mut self.transactions, v),
            Rows::Expenses(v) => replace_len(&mut self.expenses, v),
            Rows::VehicleHistory(v) => replace_len(&mut self.vehicle_history, v),
            Rows::Products(v) => replace_len(&mut self.products, v),
            Rows::Employees(v) => replace_len(&mut self.employees, v),
        }
    }
}

fn replace_len<T>(slot: &mut Vec<T>, rows: Vec<T>) -> usize {
    *slot = rows;
    slot.len()
}

/// The shared snapshot plus its stale-table bookkeeping.
#[derive(Debug)]
pub struct SnapshotStore {
    data: RwLock<Snapshot>,
    stale: Mutex<BTreeSet<Table>>,
    wake: Notify,
    fetches: AtomicUsize,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// An empty store with every table stale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Snapshot::default()),
            stale: Mutex::new(Table::ALL.into_iter().collect()),
            wake: Notify::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Marks `table` stale and wakes the refresher.
    pub fn invalidate(&self, table: Table) {
        let inserted = self
            .stale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table);
        if inserted {
            debug!(table = table.name(), "Table marked stale");
        }
        self.wake.notify_one();
    }

    /// Tables waiting for a refetch.
    #[must_use]
    pub fn stale_tables(&self) -> Vec<Table> {
        self.stale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// How many table selects the store has run.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Re-selects every stale table once and returns the tables refreshed.
    ///
    /// # Errors
    /// Returns the first query error. The failed table and those not reached yet
    /// stay stale for the next attempt.
    pub async fn refresh_pending(&self, db: &DatabaseConnection) -> Result<Vec<Table>> {
        let pending: Vec<Table> = std::mem::take(
            &mut *self.stale.lock().unwrap_or_else(PoisonError::into_inner),
        )
        .into_iter()
        .collect();

        let mut refreshed = Vec::with_capacity(pending.len());
        for (i, &table) in pending.iter().enumerate() {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            match select_all(db, table).await {
                Ok(rows) => {
                    let count = self.data.write().await.replace(rows);
                    debug!(table = table.name(), count, "Table refreshed");
                    refreshed.push(table);
                }
                Err(e) => {
                    self.stale
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend(pending[i..].iter().copied());
                    return Err(e);
                }
            }
        }
        Ok(refreshed)
    }

    /// Read access to the current snapshot.
    pub async fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.data.read().await
    }

    /// Copy of the rooms table.
    pub async fn rooms(&self) -> Vec<room::Model> {
        self.data.read().await.rooms.clone()
    }

    /// The tables sent along with a consultant question.
    pub async fn motel_snapshot(&self, captured_at: DateTime<Utc>) -> MotelSnapshot {
        let data = self.data.read().await;
        MotelSnapshot {
            rooms: data.rooms.clone(),
            transactions: data.transactions.clone(),
            products: data.products.iter().filter(|p| !p.is_deleted).cloned().collect(),
            expenses: data.expenses.clone(),
            captured_at,
        }
    }

    /// Refreshes stale tables whenever woken, until `shutdown` turns true.
    pub async fn run_refresher(
        self: Arc<Self>,
        db: DatabaseConnection,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("Snapshot refresher started");
        loop {
            if let Err(e) = self.refresh_pending(&db).await {
                error!("Snapshot refresh failed: {}", e);
            }
            tokio::select! {
                () = self.wake.notified() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Snapshot refresher stopped");
    }
}
