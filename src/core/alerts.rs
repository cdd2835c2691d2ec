//! Expiry alerts - Occupied rooms whose stay ends soon or already ended.

use crate::entities::{RoomStatus, room};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// An occupied room close to (or past) its check-out time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryAlert {
    /// Room flagged
    pub room_id: i64,
    /// Display name of the room
    pub room_name: String,
    /// Scheduled check-out
    pub check_out_time: DateTime<Utc>,
    /// Whole minutes until check-out, negative when overdue
    pub minutes_remaining: i64,
}

impl ExpiryAlert {
    /// Whether the stay already ran out.
    #[must_use]
    pub const fn is_overdue(&self) -> bool {
        self.minutes_remaining < 0
    }
}

/// Occupied rooms whose check-out falls within `window` of `now`, soonest first.
///
/// Overdue rooms are always included.
#[must_use]
pub fn expiring_rooms(rooms: &[room::Model], now: DateTime<Utc>, window: Duration) -> Vec<ExpiryAlert> {
    let mut alerts: Vec<ExpiryAlert> = rooms
        .iter()
        .filter(|r| r.status == RoomStatus::Occupied)
        .filter_map(|r| {
            let check_out_time = r.check_out_time?;
            let remaining = check_out_time - now;
            (remaining <= window).then(|| ExpiryAlert {
                room_id: r.id,
                room_name: r.name.clone(),
                check_out_time,
                minutes_remaining: remaining.num_minutes(),
            })
        })
        .collect();
    alerts.sort_by_key(|a| (a.check_out_time, a.room_id));
    alerts
}
