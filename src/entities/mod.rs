//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the front desk tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod employee;
pub mod expense;
pub mod product;
pub mod rate;
pub mod room;
pub mod room_type;
pub mod shift;
pub mod stay;
pub mod transaction;
pub mod vehicle_history;

// Re-export specific types to avoid conflicts
pub use employee::{
    Column as EmployeeColumn, Entity as Employee, EmployeeStatus, Model as EmployeeModel,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use rate::{Column as RateColumn, Entity as Rate, Model as RateModel};
pub use room::{Column as RoomColumn, Entity as Room, Model as RoomModel, RoomStatus};
pub use room_type::{Column as RoomTypeColumn, Entity as RoomType, Model as RoomTypeModel};
pub use shift::Shift;
pub use stay::{Column as StayColumn, Entity as Stay, Model as StayModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
pub use vehicle_history::{
    Column as VehicleHistoryColumn, Entity as VehicleHistory, Model as VehicleHistoryModel,
};
