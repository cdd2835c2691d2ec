//! Unified error type for the front desk.
//!
//! Validation failures and refused transitions are detected before any write and
//! share this enum with backend failures; callers surface all of them the same way.

use crate::entities::RoomStatus;
use thiserror::Error;

/// Every failure a front desk operation can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input failed validation before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// What went wrong
        message: String,
    },

    /// A money amount was zero, negative or not finite where that is not allowed
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// The room does not exist
    #[error("Room not found: {id}")]
    RoomNotFound {
        /// Requested room id
        id: i64,
    },

    /// The room type does not exist
    #[error("Room type not found: {id}")]
    RoomTypeNotFound {
        /// Requested room type id
        id: i64,
    },

    /// The rate does not exist or does not apply here
    #[error("Rate not found: {id}")]
    RateNotFound {
        /// Requested rate id
        id: i64,
    },

    /// The product does not exist or was deleted
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// The employee does not exist
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// Requested employee id
        id: i64,
    },

    /// The expense does not exist
    #[error("Expense not found: {id}")]
    ExpenseNotFound {
        /// Requested expense id
        id: i64,
    },

    /// The room is not in a state that allows the requested action
    #[error("Room {room_id} is {status:?}; cannot {action}")]
    InvalidTransition {
        /// Room the action targeted
        room_id: i64,
        /// Status the room was in
        status: RoomStatus,
        /// The refused action
        action: &'static str,
    },

    /// Release refused because remote controls are still loaned out
    #[error("Pending controls for room {room_id}: {tv} TV, {ac} A/C")]
    PendingControls {
        /// Room being released
        room_id: i64,
        /// TV remotes not yet returned
        tv: i32,
        /// A/C remotes not yet returned
        ac: i32,
    },

    /// Remove Person refused on an empty room
    #[error("Room {room_id} has no persons to remove")]
    NoPersonsToRemove {
        /// Room the action targeted
        room_id: i64,
    },

    /// Package changes only go up in price
    #[error("Package downgrade not allowed: current {current}, requested {requested}")]
    DowngradeNotAllowed {
        /// Price of the active rate
        current: f64,
        /// Price of the requested rate
        requested: f64,
    },

    /// The active rate does not grant enough hours to be extended
    #[error("Rate {rate_id} grants {hours}h; extensions need at least {minimum}h")]
    ExtensionNotOffered {
        /// Active rate
        rate_id: i64,
        /// Hours the active rate grants
        hours: i32,
        /// Minimum hours required
        minimum: i32,
    },

    /// No extension rate is configured for the room type
    #[error("No extension rate configured for room type {room_type_id}")]
    ExtensionUnavailable {
        /// Room type that lacks an extension rate
        room_type_id: i64,
    },

    /// The room type is still referenced by rooms or rates
    #[error("Room type {id} is in use by {rooms} room(s) and {rates} rate(s)")]
    RoomTypeInUse {
        /// Room type that was to be deleted
        id: i64,
        /// Rooms referencing it
        rooms: u64,
        /// Rates referencing it
        rates: u64,
    },

    /// The rate is the active rate of occupied rooms
    #[error("Rate {id} is the active rate of {rooms} occupied room(s)")]
    RateInUse {
        /// Rate that was to be deleted or reclassified
        id: i64,
        /// Rooms running a stay on it
        rooms: u64,
    },

    /// Not enough stock for a sale
    #[error("Insufficient stock for product {product_id}: have {available}, need {requested}")]
    InsufficientStock {
        /// Product being sold
        product_id: i64,
        /// Units in stock
        available: i32,
        /// Units requested
        requested: i32,
    },

    /// The employee is not active
    #[error("Employee {id} is inactive")]
    EmployeeInactive {
        /// Employee id
        id: i64,
    },

    /// Administrative password check failed
    #[error("Administrative password rejected")]
    AdminDenied,

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
