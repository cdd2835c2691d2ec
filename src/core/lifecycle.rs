//! Room lifecycle - Guest-facing state transitions of a room.
//!
//! ```text
//! Available --check_in--> Occupied --release--> Cleaning --mark_available--> Available
//!                         Occupied(A) --swap_room--> Cleaning(A) + Occupied(B)
//! ```
//!
//! Every transition runs in one database transaction. Charges are appended to the
//! ledger before the room row is written, and the room's `total_debt` moves by
//! exactly the charged amount, so either the charge and the debt both land or
//! neither does.

use crate::{
    core::{
        billing::{Charge, append_charge, increment_room_debt_atomic},
        rate::{get_extension_rate, get_rate_by_id},
        room::{clear_occupancy, get_room_by_id},
        shift::ShiftClock,
        stay::{close_stay, get_active_stay, move_stay, open_stay},
        vehicle::{VehicleInfo, close_vehicle_records, open_vehicle_record, repoint_vehicle_records},
    },
    entities::{RoomStatus, TransactionType, rate, room, stay, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Minimum hours the active rate must grant before an extension is offered.
pub const MIN_HOURS_FOR_EXTENSION: i32 = 8;

/// End of a stay that starts at `start` and lasts `hours`.
#[must_use]
pub fn scheduled_check_out(start: DateTime<Utc>, hours: i32) -> DateTime<Utc> {
    start + Duration::hours(i64::from(hours))
}

/// Everything the desk enters when checking a guest in.
#[derive(Debug, Clone)]
pub struct CheckInRequest {
    /// Rate chosen by the guest
    pub rate_id: i64,
    /// Start of the stay
    pub check_in_time: DateTime<Utc>,
    /// Scheduled end of the stay
    pub check_out_time: DateTime<Utc>,
    /// Guests entering the room
    pub persons: i32,
    /// Guest name, if given
    pub customer_name: Option<String>,
    /// Guest vehicle, if any
    pub vehicle: Option<VehicleInfo>,
}

impl CheckInRequest {
    /// A request for `rate` starting at `start`, ending after the rate's hours.
    #[must_use]
    pub fn for_rate(rate: &rate::Model, start: DateTime<Utc>, persons: i32) -> Self {
        Self {
            rate_id: rate.id,
            check_in_time: start,
            check_out_time: scheduled_check_out(start, rate.hours),
            persons,
            customer_name: None,
            vehicle: None,
        }
    }
}

/// Result of a successful check-in.
#[derive(Debug, Clone)]
pub struct CheckIn {
    /// Room after the transition
    pub room: room::Model,
    /// Stay that was opened
    pub stay: stay::Model,
    /// Initial Stay charge, None for a free rate
    pub charge: Option<transaction::Model>,
}

/// Result of a successful release.
#[derive(Debug, Clone)]
pub struct Release {
    /// Room after the transition
    pub room: room::Model,
    /// Stay that was closed
    pub stay: Option<stay::Model>,
    /// Vehicle records closed
    pub vehicles_closed: usize,
}

/// Result of a successful room swap.
#[derive(Debug, Clone)]
pub struct Swap {
    /// Source room, now cleaning
    pub from: room::Model,
    /// Destination room, now holding the stay
    pub to: room::Model,
}

/// Result of a transition that charges a running stay.
#[derive(Debug, Clone)]
pub struct StayCharge {
    /// Room after the transition
    pub room: room::Model,
    /// Charge appended, None for complimentary changes
    pub charge: Option<transaction::Model>,
}

async fn load_room<C>(db: &C, room_id: i64) -> Result<room::Model>
where
    C: ConnectionTrait,
{
    get_room_by_id(db, room_id)
        .await?
        .ok_or(Error::RoomNotFound { id: room_id })
}

fn require_status(room: &room::Model, expected: RoomStatus, action: &'static str) -> Result<()> {
    if room.status == expected {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            room_id: room.id,
            status: room.status,
            action,
        })
    }
}

async fn load_active_stay<C>(db: &C, room: &room::Model) -> Result<stay::Model>
where
    C: ConnectionTrait,
{
    get_active_stay(db, room.id)
        .await?
        .ok_or(Error::InvalidTransition {
            room_id: room.id,
            status: room.status,
            action: "find the running stay",
        })
}

async fn load_current_rate<C>(db: &C, room: &room::Model) -> Result<rate::Model>
where
    C: ConnectionTrait,
{
    let rate_id = room.rate_id.ok_or_else(|| Error::Validation {
        message: format!("Room {} has no active rate", room.id),
    })?;
    get_rate_by_id(db, rate_id)
        .await?
        .ok_or(Error::RateNotFound { id: rate_id })
}

/// Rates offered to a room must be regular rates of its own room type.
fn ensure_primary_rate_for(room: &room::Model, rate: &rate::Model) -> Result<()> {
    if rate.room_type_id != room.room_type_id {
        return Err(Error::Validation {
            message: format!(
                "Rate '{}' is for room type {}, room {} is type {}",
                rate.name, rate.room_type_id, room.id, room.room_type_id
            ),
        });
    }
    if rate.is_extra_hour {
        return Err(Error::Validation {
            message: format!("Rate '{}' is an extension and cannot start a stay", rate.name),
        });
    }
    Ok(())
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks a guest into an available room.
///
/// Opens a stay, charges the rate's price as Initial Stay (free rates produce no
/// charge), opens a vehicle record when a plate was entered, and fills the room's
/// occupancy fields with `total_debt` equal to the price.
///
/// # Errors
/// Returns an error if the request is invalid, the room is not available, the
/// rate does not apply to the room, or a write fails. Nothing is written on error.
#[instrument(skip(db, clock, request), fields(rate_id = request.rate_id))]
pub async fn check_in(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    room_id: i64,
    request: CheckInRequest,
) -> Result<CheckIn> {
    if request.check_out_time <= request.check_in_time {
        return Err(Error::Validation {
            message: "Check-out time must be after check-in time".to_string(),
        });
    }
    if request.persons < 1 {
        return Err(Error::Validation {
            message: format!("A stay needs at least one person, got {}", request.persons),
        });
    }

    let txn = db.begin().await?;

    let room = load_room(&txn, room_id).await?;
    require_status(&room, RoomStatus::Available, "check in")?;

    let rate = get_rate_by_id(&txn, request.rate_id)
        .await?
        .ok_or(Error::RateNotFound {
            id: request.rate_id,
        })?;
    ensure_primary_rate_for(&room, &rate)?;

    let vehicle = request.vehicle.as_ref().and_then(VehicleInfo::normalized);
    let customer_name = clean_text(request.customer_name);
    let now = clock.now();

    let stay = open_stay(
        &txn,
        room_id,
        customer_name.clone(),
        vehicle.as_ref().map(|v| v.plate.clone()),
        request.check_in_time,
        now,
    )
    .await?;

    let charge = if rate.price > 0.0 {
        Some(
            append_charge(
                &txn,
                clock,
                Charge::for_stay(
                    TransactionType::InitialStay,
                    rate.price,
                    format!("Renta {} ({})", room.name, rate.name),
                    room_id,
                    stay.id,
                ),
            )
            .await?,
        )
    } else {
        None
    };

    if let Some(vehicle) = &vehicle {
        open_vehicle_record(&txn, room_id, vehicle, request.check_in_time).await?;
    }

    let mut active: room::ActiveModel = room.into();
    active.status = Set(RoomStatus::Occupied);
    active.check_in_time = Set(Some(request.check_in_time));
    active.check_out_time = Set(Some(request.check_out_time));
    active.rate_id = Set(Some(rate.id));
    active.total_debt = Set(rate.price.max(0.0));
    active.persons = Set(request.persons);
    active.tv_controls = Set(0);
    active.ac_controls = Set(0);
    active.customer_name = Set(customer_name);
    active.vehicle_plate = Set(vehicle.as_ref().map(|v| v.plate.clone()));
    active.vehicle_brand = Set(vehicle.as_ref().and_then(|v| v.brand.clone()));
    active.vehicle_color = Set(vehicle.as_ref().and_then(|v| v.color.clone()));
    let room = active.update(&txn).await?;

    txn.commit().await?;
    info!(
        room_id,
        stay_id = stay.id,
        "Checked in room '{}' until {}",
        room.name,
        request.check_out_time
    );
    Ok(CheckIn { room, stay, charge })
}

/// Releases an occupied room to housekeeping.
///
/// Refused while any remote control is still on loan. Clears every occupancy
/// field, closes the stay with its final debt and closes the room's vehicle records.
///
/// # Errors
/// Returns `PendingControls` if remotes are out, `InvalidTransition` if the room
/// is not occupied, or a database error.
#[instrument(skip(db, clock))]
pub async fn release(db: &DatabaseConnection, clock: &ShiftClock, room_id: i64) -> Result<Release> {
    let txn = db.begin().await?;

    let room = load_room(&txn, room_id).await?;
    require_status(&room, RoomStatus::Occupied, "release")?;
    if room.tv_controls > 0 || room.ac_controls > 0 {
        warn!(
            room_id,
            tv = room.tv_controls,
            ac = room.ac_controls,
            "Release refused: controls not returned"
        );
        return Err(Error::PendingControls {
            room_id,
            tv: room.tv_controls,
            ac: room.ac_controls,
        });
    }

    let now = clock.now();
    let final_debt = room.total_debt;

    let vehicles_closed = close_vehicle_records(&txn, room_id, now).await?;
    let stay = match get_active_stay(&txn, room_id).await? {
        Some(stay) => Some(close_stay(&txn, stay, now, final_debt).await?),
        None => None,
    };

    let mut active: room::ActiveModel = room.into();
    clear_occupancy(&mut active, RoomStatus::Cleaning);
    let room = active.update(&txn).await?;

    txn.commit().await?;
    info!(room_id, final_debt, "Released room '{}'", room.name);
    Ok(Release {
        room,
        stay,
        vehicles_closed,
    })
}

/// Moves a running stay from one room to an available room of the same type.
///
/// The destination receives every occupancy field of the source (times, guest,
/// vehicle, rate, debt, headcount and controls). The source is then cleared to
/// Cleaning without the controls check, and the stay and its open vehicle records
/// follow the guest.
///
/// # Errors
/// Returns an error if the rooms are the same or of different room types, the
/// source is not occupied, the destination is not available, or a write fails.
/// On error neither room changes.
#[instrument(skip(db))]
pub async fn swap_room(
    db: &DatabaseConnection,
    from_room_id: i64,
    to_room_id: i64,
) -> Result<Swap> {
    if from_room_id == to_room_id {
        return Err(Error::Validation {
            message: "Source and destination rooms must differ".to_string(),
        });
    }

    let txn = db.begin().await?;

    let source = load_room(&txn, from_room_id).await?;
    require_status(&source, RoomStatus::Occupied, "move a stay out")?;
    let target = load_room(&txn, to_room_id).await?;
    require_status(&target, RoomStatus::Available, "receive a stay")?;
    // The stay keeps its rate, and rates belong to one room type.
    if target.room_type_id != source.room_type_id {
        return Err(Error::Validation {
            message: format!(
                "Room {} is type {}, room {} is type {}; a stay only moves within its type",
                source.id, source.room_type_id, target.id, target.room_type_id
            ),
        });
    }
    let stay = get_active_stay(&txn, from_room_id).await?;

    let mut incoming: room::ActiveModel = target.into();
    incoming.status = Set(RoomStatus::Occupied);
    incoming.check_in_time = Set(source.check_in_time);
    incoming.check_out_time = Set(source.check_out_time);
    incoming.rate_id = Set(source.rate_id);
    incoming.total_debt = Set(source.total_debt);
    incoming.persons = Set(source.persons);
    incoming.tv_controls = Set(source.tv_controls);
    incoming.ac_controls = Set(source.ac_controls);
    incoming.customer_name = Set(source.customer_name.clone());
    incoming.vehicle_plate = Set(source.vehicle_plate.clone());
    incoming.vehicle_brand = Set(source.vehicle_brand.clone());
    incoming.vehicle_color = Set(source.vehicle_color.clone());
    let to = incoming.update(&txn).await?;

    let mut outgoing: room::ActiveModel = source.into();
    clear_occupancy(&mut outgoing, RoomStatus::Cleaning);
    let from = outgoing.update(&txn).await?;

    repoint_vehicle_records(&txn, from_room_id, to_room_id).await?;
    if let Some(stay) = stay {
        move_stay(&txn, stay, to_room_id).await?;
    }

    txn.commit().await?;
    info!(
        from_room_id,
        to_room_id, "Moved stay from '{}' to '{}'", from.name, to.name
    );
    Ok(Swap { from, to })
}

/// Upgrades the running stay to a more expensive rate of the same room type.
///
/// Charges the price difference as a Package Adjustment, recomputes the check-out
/// time from the original check-in plus the new rate's hours and adds the
/// difference to `total_debt`.
///
/// # Errors
/// Returns `DowngradeNotAllowed` unless the new rate costs strictly more, a
/// validation error for rates of another type or extension rates, or a database
/// error.
#[instrument(skip(db, clock))]
pub async fn adjust_package(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    room_id: i64,
    new_rate_id: i64,
) -> Result<StayCharge> {
    let txn = db.begin().await?;

    let room = load_room(&txn, room_id).await?;
    require_status(&room, RoomStatus::Occupied, "change package")?;
    let current = load_current_rate(&txn, &room).await?;
    let new_rate = get_rate_by_id(&txn, new_rate_id)
        .await?
        .ok_or(Error::RateNotFound { id: new_rate_id })?;
    ensure_primary_rate_for(&room, &new_rate)?;

    if new_rate.price <= current.price {
        return Err(Error::DowngradeNotAllowed {
            current: current.price,
            requested: new_rate.price,
        });
    }
    let check_in_time = room.check_in_time.ok_or_else(|| Error::Validation {
        message: format!("Room {room_id} has no check-in time"),
    })?;
    let stay = load_active_stay(&txn, &room).await?;

    let difference = new_rate.price - current.price;
    let charge = append_charge(
        &txn,
        clock,
        Charge::for_stay(
            TransactionType::PackageAdjustment,
            difference,
            format!("Cambio de paquete {} → {}", current.name, new_rate.name),
            room_id,
            stay.id,
        ),
    )
    .await?;

    let mut active: room::ActiveModel = room.into();
    active.check_out_time = Set(Some(scheduled_check_out(check_in_time, new_rate.hours)));
    active.rate_id = Set(Some(new_rate.id));
    active.update(&txn).await?;
    let room = increment_room_debt_atomic(&txn, room_id, difference).await?;

    txn.commit().await?;
    info!(room_id, difference, "Upgraded package to '{}'", new_rate.name);
    Ok(StayCharge {
        room,
        charge: Some(charge),
    })
}

/// Extends the running stay by the room type's extension rate.
///
/// Only offered when the active rate grants at least [`MIN_HOURS_FOR_EXTENSION`]
/// hours. Charges the extension as Extra Time, pushes the check-out time back by
/// the extension's hours and adds its price to `total_debt`.
///
/// # Errors
/// Returns `ExtensionNotOffered` for short rates, `ExtensionUnavailable` when the
/// room type has no extension rate, or a database error. Nothing changes on error.
#[instrument(skip(db, clock))]
pub async fn extend_stay(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    room_id: i64,
) -> Result<StayCharge> {
    let txn = db.begin().await?;

    let room = load_room(&txn, room_id).await?;
    require_status(&room, RoomStatus::Occupied, "extend")?;
    let current = load_current_rate(&txn, &room).await?;
    if current.hours < MIN_HOURS_FOR_EXTENSION {
        return Err(Error::ExtensionNotOffered {
            rate_id: current.id,
            hours: current.hours,
            minimum: MIN_HOURS_FOR_EXTENSION,
        });
    }
    let extension = get_extension_rate(&txn, room.room_type_id)
        .await?
        .ok_or(Error::ExtensionUnavailable {
            room_type_id: room.room_type_id,
        })?;
    let check_out_time = room.check_out_time.ok_or_else(|| Error::Validation {
        message: format!("Room {room_id} has no check-out time"),
    })?;
    let stay = load_active_stay(&txn, &room).await?;

    let charge = if extension.price > 0.0 {
        Some(
            append_charge(
                &txn,
                clock,
                Charge::for_stay(
                    TransactionType::ExtraTime,
                    extension.price,
                    format!("Tiempo extra ({})", extension.name),
                    room_id,
                    stay.id,
                ),
            )
            .await?,
        )
    } else {
        None
    };

    let mut active: room::ActiveModel = room.into();
    active.check_out_time = Set(Some(scheduled_check_out(check_out_time, extension.hours)));
    active.update(&txn).await?;
    let room = increment_room_debt_atomic(&txn, room_id, extension.price.max(0.0)).await?;

    txn.commit().await?;
    info!(room_id, hours = extension.hours, "Extended stay");
    Ok(StayCharge { room, charge })
}

/// Adds one guest to a running stay, optionally charging a fee.
///
/// A zero `fee` is a complimentary add: the headcount grows and nothing is charged.
///
/// # Errors
/// Returns `InvalidAmount` for negative or non-finite fees, `InvalidTransition`
/// if the room is not occupied, or a database error.
#[instrument(skip(db, clock))]
pub async fn add_person(
    db: &DatabaseConnection,
    clock: &ShiftClock,
    room_id: i64,
    fee: f64,
) -> Result<StayCharge> {
    if fee < 0.0 || !fee.is_finite() {
        return Err(Error::InvalidAmount { amount: fee });
    }

    let txn = db.begin().await?;

    let room = load_room(&txn, room_id).await?;
    require_status(&room, RoomStatus::Occupied, "add a person")?;

    let charge = if fee > 0.0 {
        let stay = load_active_stay(&txn, &room).await?;
        Some(
            append_charge(
                &txn,
                clock,
                Charge::for_stay(
                    TransactionType::ExtraPerson,
                    fee,
                    format!("Persona extra {}", room.name),
                    room_id,
                    stay.id,
                ),
            )
            .await?,
        )
    } else {
        None
    };

    let persons = room.persons + 1;
    let mut active: room::ActiveModel = room.into();
    active.persons = Set(persons);
    active.update(&txn).await?;
    let room = increment_room_debt_atomic(&txn, room_id, fee).await?;

    txn.commit().await?;
    info!(room_id, persons, fee, "Added person");
    Ok(StayCharge { room, charge })
}

/// Removes one guest. The debt is not refunded.
///
/// # Errors
/// Returns `NoPersonsToRemove` when the headcount is already zero, or a database
/// error.
#[instrument(skip(db))]
pub async fn remove_person(db: &DatabaseConnection, room_id: i64) -> Result<room::Model> {
    let room = load_room(db, room_id).await?;
    if room.persons <= 0 {
        warn!(room_id, "Remove person refused: room is empty");
        return Err(Error::NoPersonsToRemove { room_id });
    }

    let persons = room.persons - 1;
    let mut active: room::ActiveModel = room.into();
    active.persons = Set(persons);
    let room = active.update(db).await?;
    info!(room_id, persons, "Removed person");
    Ok(room)
}
