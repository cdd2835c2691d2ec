/// Expiry alerts for rooms close to check-out
pub mod alerts;

/// Transaction ledger, room debt cache, reconciliation and product sales
pub mod billing;

/// Time sources
pub mod clock;

/// Request and response bodies for the external consultant service
pub mod consultant;

/// Employee accounts
pub mod employee;

/// Cash outflows
pub mod expense;

/// Guest-facing room transitions
pub mod lifecycle;

/// Room service menu and stock
pub mod product;

/// Rates and the administrative gate
pub mod rate;

/// Shift summaries and stay logs
pub mod report;

/// Room inventory, housekeeping and remote controls
pub mod room;

/// Room types
pub mod room_type;

/// Inventory seeding from config.toml
pub mod seed;

/// Shift and operational date computation
pub mod shift;

/// Stay records
pub mod stay;

/// Vehicle history
pub mod vehicle;
