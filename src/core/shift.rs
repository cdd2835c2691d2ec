//! Shift clock - Maps instants to operating shifts and operational dates.
//!
//! The desk runs three shifts in the business's local time zone:
//! - Matutino: 07:00 to 14:00
//! - Vespertino: 14:00 to 21:00
//! - Nocturno: 21:00 to 07:00
//!
//! A night shift belongs to the day it started, so the pre-dawn hours carry the
//! previous calendar day as their operational date.

use crate::core::clock::Clock;
pub use crate::entities::Shift;
use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;

/// Shift and operational date an instant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShiftInfo {
    /// Shift in effect
    pub shift: Shift,
    /// Calendar day the shift is attributed to
    pub operational_date: NaiveDate,
}

/// Computes the shift and operational date of `instant` in time zone `tz`.
#[must_use]
pub fn shift_info(instant: DateTime<Utc>, tz: Tz) -> ShiftInfo {
    let local = instant.with_timezone(&tz);
    let date = local.date_naive();

    let (shift, operational_date) = match local.hour() {
        7..=13 => (Shift::Matutino, date),
        14..=20 => (Shift::Vespertino, date),
        21..=23 => (Shift::Nocturno, date),
        _ => (
            Shift::Nocturno,
            date.checked_sub_days(Days::new(1)).unwrap_or(date),
        ),
    };

    ShiftInfo {
        shift,
        operational_date,
    }
}

/// The business time zone paired with a time source.
#[derive(Clone)]
pub struct ShiftClock {
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ShiftClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShiftClock")
            .field("tz", &self.tz)
            .field("now", &self.clock.now())
            .finish()
    }
}

impl ShiftClock {
    /// Creates a shift clock for `tz` reading time from `clock`.
    #[must_use]
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { tz, clock }
    }

    /// The business time zone.
    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        self.tz
    }

    /// The current instant.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Shift info of an arbitrary instant.
    #[must_use]
    pub fn info(&self, instant: DateTime<Utc>) -> ShiftInfo {
        shift_info(instant, self.tz)
    }

    /// Shift info of the current instant.
    #[must_use]
    pub fn now_info(&self) -> ShiftInfo {
        self.info(self.now())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Mexico_City;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Mexico_City
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_morning_boundary_is_inclusive() {
        let info = shift_info(local(2024, 5, 10, 7, 0), Mexico_City);
        assert_eq!(info.shift, Shift::Matutino);
        assert_eq!(info.operational_date, date(2024, 5, 10));
    }

    #[test]
    fn test_just_before_seven_is_previous_night() {
        let info = shift_info(local(2024, 5, 10, 6, 59), Mexico_City);
        assert_eq!(info.shift, Shift::Nocturno);
        assert_eq!(info.operational_date, date(2024, 5, 9));
    }

    #[test]
    fn test_afternoon_boundaries() {
        let at_two = shift_info(local(2024, 5, 10, 14, 0), Mexico_City);
        assert_eq!(at_two.shift, Shift::Vespertino);

        let before_two = shift_info(local(2024, 5, 10, 13, 59), Mexico_City);
        assert_eq!(before_two.shift, Shift::Matutino);

        let before_nine = shift_info(local(2024, 5, 10, 20, 59), Mexico_City);
        assert_eq!(before_nine.shift, Shift::Vespertino);
        assert_eq!(before_nine.operational_date, date(2024, 5, 10));
    }

    #[test]
    fn test_night_shift_starts_at_nine_on_same_day() {
        let info = shift_info(local(2024, 5, 10, 21, 0), Mexico_City);
        assert_eq!(info.shift, Shift::Nocturno);
        assert_eq!(info.operational_date, date(2024, 5, 10));
    }

    #[test]
    fn test_midnight_belongs_to_previous_day() {
        let info = shift_info(local(2024, 5, 11, 0, 0), Mexico_City);
        assert_eq!(info.shift, Shift::Nocturno);
        assert_eq!(info.operational_date, date(2024, 5, 10));
    }

    #[test]
    fn test_first_of_month_rolls_back_across_month() {
        let info = shift_info(local(2024, 3, 1, 3, 30), Mexico_City);
        assert_eq!(info.operational_date, date(2024, 2, 29));
    }

    #[test]
    fn test_every_hour_maps_to_a_shift_and_date_rule_holds() {
        let start = local(2024, 5, 10, 0, 0);
        for step in 0..(48 * 4) {
            let instant = start + Duration::minutes(15 * step);
            let local_time = instant.with_timezone(&Mexico_City);
            let info = shift_info(instant, Mexico_City);
            let expected_date = if local_time.hour() < 7 {
                local_time.date_naive().pred_opt().unwrap()
            } else {
                local_time.date_naive()
            };
            assert_eq!(info.operational_date, expected_date);
            assert!(Shift::ALL.contains(&info.shift));
        }
    }

    #[test]
    fn test_uses_business_time_zone_not_utc() {
        // 15:00 UTC is 09:00 in Mexico City (UTC-6, no DST since 2022)
        let instant = Utc.with_ymd_and_hms(2024, 5, 10, 15, 0, 0).unwrap();
        assert_eq!(shift_info(instant, Mexico_City).shift, Shift::Matutino);
        assert_eq!(shift_info(instant, chrono_tz::UTC).shift, Shift::Vespertino);
    }

    #[test]
    fn test_shift_clock_reads_injected_time() {
        let clock = Arc::new(FixedClock::new(local(2024, 5, 10, 22, 15)));
        let shift_clock = ShiftClock::new(Mexico_City, clock.clone());
        assert_eq!(shift_clock.now_info().shift, Shift::Nocturno);

        clock.advance(Duration::hours(10));
        let info = shift_clock.now_info();
        assert_eq!(info.shift, Shift::Matutino);
        assert_eq!(info.operational_date, date(2024, 5, 11));
    }
}
