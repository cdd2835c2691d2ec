//! Report generation business logic.
//!
//! Shift reports bucket ledger entries and expenses by the `(operational_date,
//! shift)` pair frozen on each row when it was written; historical rows are never
//! re-run through the shift clock. Income is split into four categories used by
//! every view:
//! - Rent: Initial Stay, Extra Time and Package Adjustment
//! - Extra persons
//! - Consumption
//! - Employee sales
//!
//! The stay log is the exception: it recomputes shifts from stay instants, since
//! stays carry no frozen shift.

use crate::{
    core::shift::shift_info,
    entities::{
        Expense, Shift, Transaction, TransactionType, expense, room, stay, transaction,
    },
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::{DatabaseConnection, QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// Income of one shift split by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IncomeBreakdown {
    /// Initial stays, extensions and package upgrades
    pub rent: f64,
    /// Extra person fees
    pub extra_persons: f64,
    /// Room service consumption
    pub consumption: f64,
    /// Products sold to staff
    pub employee_sales: f64,
}

impl IncomeBreakdown {
    fn record(&mut self, entry: &transaction::Model) {
        let bucket = match entry.transaction_type {
            TransactionType::InitialStay
            | TransactionType::ExtraTime
            | TransactionType::PackageAdjustment => &mut self.rent,
            TransactionType::ExtraPerson => &mut self.extra_persons,
            TransactionType::Consumption => &mut self.consumption,
            TransactionType::EmployeeSale => &mut self.employee_sales,
        };
        *bucket += entry.amount;
    }

    /// Sum of every category.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rent + self.extra_persons + self.consumption + self.employee_sales
    }
}

/// Financial summary of one shift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftSummary {
    /// Operational date reported on
    pub operational_date: NaiveDate,
    /// Shift reported on
    pub shift: Shift,
    /// Income by category
    pub income: IncomeBreakdown,
    /// Sum of all income
    pub total_income: f64,
    /// Sum of all expenses
    pub total_expenses: f64,
    /// `total_income - total_expenses`
    pub net_profit: f64,
    /// Ledger entries counted
    pub transaction_count: usize,
    /// Expenses counted
    pub expense_count: usize,
}

/// Summarises the entries and expenses frozen on `(date, shift)`.
///
/// Rows of any other date or shift are ignored, so callers may pass whole tables.
#[must_use]
pub fn summarize(
    transactions: &[transaction::Model],
    expenses: &[expense::Model],
    date: NaiveDate,
    shift: Shift,
) -> ShiftSummary {
    let mut income = IncomeBreakdown::default();
    let mut transaction_count = 0;
    for entry in transactions
        .iter()
        .filter(|t| t.operational_date == date && t.shift == shift)
    {
        income.record(entry);
        transaction_count += 1;
    }

    let expenses: Vec<&expense::Model> = expenses
        .iter()
        .filter(|e| e.operational_date == date && e.shift == shift)
        .collect();
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let total_income = income.total();

    ShiftSummary {
        operational_date: date,
        shift,
        income,
        total_income,
        total_expenses,
        net_profit: total_income - total_expenses,
        transaction_count,
        expense_count: expenses.len(),
    }
}

/// Summary of one shift read from the database.
///
/// # Errors
/// Returns an error if a query fails.
pub async fn shift_summary(
    db: &DatabaseConnection,
    date: NaiveDate,
    shift: Shift,
) -> Result<ShiftSummary> {
    let transactions = Transaction::find()
        .filter(transaction::Column::OperationalDate.eq(date))
        .filter(transaction::Column::Shift.eq(shift))
        .all(db)
        .await?;
    let expenses = Expense::find()
        .filter(expense::Column::OperationalDate.eq(date))
        .filter(expense::Column::Shift.eq(shift))
        .all(db)
        .await?;
    Ok(summarize(&transactions, &expenses, date, shift))
}

/// One summary per shift of an operational date, in shift order.
///
/// # Errors
/// Returns an error if a query fails.
pub async fn daily_summary(db: &DatabaseConnection, date: NaiveDate) -> Result<Vec<ShiftSummary>> {
    let transactions = Transaction::find()
        .filter(transaction::Column::OperationalDate.eq(date))
        .all(db)
        .await?;
    let expenses = Expense::find()
        .filter(expense::Column::OperationalDate.eq(date))
        .all(db)
        .await?;
    Ok(Shift::ALL
        .iter()
        .map(|&shift| summarize(&transactions, &expenses, date, shift))
        .collect())
}

/// One line of the stay log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StayLogEntry {
    /// Stay shown
    pub stay_id: i64,
    /// Room holding (or last holding) the stay
    pub room_id: i64,
    /// Display name of that room
    pub room_name: String,
    /// Guest name, if given
    pub customer_name: Option<String>,
    /// Guest vehicle plate, if any
    pub vehicle_plate: Option<String>,
    /// Start of the stay
    pub check_in_time: DateTime<Utc>,
    /// End of the stay, None while running
    pub released_at: Option<DateTime<Utc>>,
    /// Current debt of a running stay or final charge of a closed one
    pub total: f64,
    /// Whether the stay started in a different shift than the one viewed
    pub carried_over: bool,
}

/// Stays to show for `(date, shift)`: every running stay plus every stay released
/// during that shift.
///
/// Entries are ordered by check-in time.
#[must_use]
pub fn stay_log(
    stays: &[stay::Model],
    rooms: &[room::Model],
    date: NaiveDate,
    shift: Shift,
    tz: Tz,
) -> Vec<StayLogEntry> {
    let rooms: HashMap<i64, &room::Model> = rooms.iter().map(|r| (r.id, r)).collect();
    let in_view = |instant: DateTime<Utc>| {
        let info = shift_info(instant, tz);
        info.operational_date == date && info.shift == shift
    };

    let mut entries: Vec<StayLogEntry> = stays
        .iter()
        .filter(|s| s.released_at.is_none_or(in_view))
        .map(|s| {
            let room = rooms.get(&s.room_id);
            let total = match (s.released_at, room) {
                (None, Some(room)) => room.total_debt,
                _ => s.total_charged,
            };
            StayLogEntry {
                stay_id: s.id,
                room_id: s.room_id,
                room_name: room.map_or_else(|| s.room_id.to_string(), |r| r.name.clone()),
                customer_name: s.customer_name.clone(),
                vehicle_plate: s.vehicle_plate.clone(),
                check_in_time: s.check_in_time,
                released_at: s.released_at,
                total,
                carried_over: !in_view(s.check_in_time),
            }
        })
        .collect();
    entries.sort_by_key(|e| (e.check_in_time, e.stay_id));
    entries
}

/// Stay log of `(date, shift)` read from the database.
///
/// # Errors
/// Returns an error if a query fails.
pub async fn shift_stay_log(
    db: &DatabaseConnection,
    date: NaiveDate,
    shift: Shift,
    tz: Tz,
) -> Result<Vec<StayLogEntry>> {
    let stays = crate::core::stay::get_all_stays(db).await?;
    let rooms = crate::entities::Room::find()
        .order_by_asc(room::Column::Id)
        .all(db)
        .await?;
    Ok(stay_log(&stays, &rooms, date, shift, tz))
}

/// Formats an amount as pesos, e.g. `$1,250.50`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}${grouped}.{cents}")
}

/// Multi-line text rendering of a shift summary.
#[must_use]
pub fn format_summary(summary: &ShiftSummary) -> String {
    let lines = [
        format!(
            "Turno {} del {}",
            summary.shift.label(),
            summary.operational_date.format("%Y-%m-%d")
        ),
        format!("  Rentas:          {}", format_money(summary.income.rent)),
        format!("  Personas extra:  {}", format_money(summary.income.extra_persons)),
        format!("  Consumos:        {}", format_money(summary.income.consumption)),
        format!("  Ventas empleados: {}", format_money(summary.income.employee_sales)),
        format!("  Ingresos:        {}", format_money(summary.total_income)),
        format!("  Gastos:          {}", format_money(summary.total_expenses)),
        format!("  Utilidad:        {}", format_money(summary.net_profit)),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        billing::sell_to_room,
        expense::record_expense,
        lifecycle::{CheckInRequest, check_in, release},
    };
    use crate::test_utils::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Mexico_City;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn entry(
        id: i64,
        transaction_type: TransactionType,
        amount: f64,
        operational_date: NaiveDate,
        shift: Shift,
    ) -> transaction::Model {
        transaction::Model {
            id,
            room_id: Some(1),
            stay_id: Some(1),
            employee_id: None,
            product_id: None,
            amount,
            transaction_type,
            description: String::new(),
            timestamp: Utc::now(),
            shift,
            operational_date,
        }
    }

    fn outflow(id: i64, amount: f64, operational_date: NaiveDate, shift: Shift) -> expense::Model {
        expense::Model {
            id,
            description: "Gasto".to_string(),
            amount,
            date: Utc::now(),
            shift,
            operational_date,
        }
    }

    #[test]
    fn test_summarize_uses_frozen_date_and_shift() {
        let transactions = vec![
            entry(1, TransactionType::InitialStay, 330.0, date(10), Shift::Matutino),
            entry(2, TransactionType::PackageAdjustment, 120.0, date(10), Shift::Matutino),
            entry(3, TransactionType::ExtraTime, 180.0, date(10), Shift::Matutino),
            entry(4, TransactionType::ExtraPerson, 100.0, date(10), Shift::Matutino),
            entry(5, TransactionType::Consumption, 50.0, date(10), Shift::Matutino),
            entry(6, TransactionType::EmployeeSale, 25.0, date(10), Shift::Matutino),
            entry(7, TransactionType::InitialStay, 450.0, date(10), Shift::Vespertino),
            entry(8, TransactionType::InitialStay, 999.0, date(11), Shift::Matutino),
        ];
        let expenses = vec![
            outflow(1, 200.0, date(10), Shift::Matutino),
            outflow(2, 75.0, date(10), Shift::Nocturno),
        ];

        let summary = summarize(&transactions, &expenses, date(10), Shift::Matutino);
        assert_eq!(summary.income.rent, 630.0);
        assert_eq!(summary.income.extra_persons, 100.0);
        assert_eq!(summary.income.consumption, 50.0);
        assert_eq!(summary.income.employee_sales, 25.0);
        assert_eq!(summary.total_income, 805.0);
        assert_eq!(summary.total_expenses, 200.0);
        assert_eq!(summary.net_profit, 605.0);
        assert_eq!(summary.transaction_count, 6);
        assert_eq!(summary.expense_count, 1);

        let other_day = summarize(&transactions, &expenses, date(11), Shift::Matutino);
        assert_eq!(other_day.total_income, 999.0);
        assert_eq!(other_day.total_expenses, 0.0);

        let night = summarize(&transactions, &expenses, date(10), Shift::Nocturno);
        assert_eq!(night.total_income, 0.0);
        assert_eq!(night.net_profit, -75.0);
    }

    #[tokio::test]
    async fn test_shift_and_daily_summary_from_database() -> Result<()> {
        let fixture = setup_with_room().await?;
        check_in_standard(&fixture).await?;
        sell_to_room(&fixture.db, &fixture.shift_clock, fixture.room.id, fixture.product.id, 2)
            .await?;
        record_expense(
            &fixture.db,
            &fixture.shift_clock,
            "Lavandería",
            100.0,
            fixture.clock.now(),
        )
        .await?;
        let info = fixture.shift_clock.now_info();

        let summary = shift_summary(&fixture.db, info.operational_date, info.shift).await?;
        assert_eq!(summary.income.rent, 330.0);
        assert_eq!(summary.income.consumption, 50.0);
        assert_eq!(summary.net_profit, 280.0);

        let day = daily_summary(&fixture.db, info.operational_date).await?;
        assert_eq!(day.len(), 3);
        assert_eq!(
            day.iter().map(|s| s.shift).collect::<Vec<_>>(),
            Shift::ALL.to_vec()
        );
        let total: f64 = day.iter().map(|s| s.total_income).sum();
        assert_eq!(total, 380.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stay_log_active_released_and_carried_over() -> Result<()> {
        let fixture = setup_with_room().await?;
        let second = create_test_room(&fixture.db, "102", fixture.room_type.id).await?;
        let tz = fixture.shift_clock.time_zone();
        let morning = fixture.shift_clock.now_info();

        let first_stay = check_in_standard(&fixture).await?;
        fixture.clock.advance(Duration::hours(5));
        let afternoon = fixture.shift_clock.now_info();
        assert_ne!(afternoon.shift, morning.shift);

        release(&fixture.db, &fixture.shift_clock, fixture.room.id).await?;
        let second_stay = check_in(
            &fixture.db,
            &fixture.shift_clock,
            second.id,
            CheckInRequest::for_rate(&fixture.premium_rate, fixture.clock.now(), 2),
        )
        .await?
        .stay;

        let log = shift_stay_log(&fixture.db, afternoon.operational_date, afternoon.shift, tz)
            .await?;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].stay_id, first_stay.id);
        assert!(log[0].carried_over);
        assert_eq!(log[0].total, 330.0);
        assert!(log[0].released_at.is_some());
        assert_eq!(log[1].stay_id, second_stay.id);
        assert!(!log[1].carried_over);
        assert_eq!(log[1].total, 450.0);
        assert_eq!(log[1].room_name, "102");

        let log = shift_stay_log(&fixture.db, morning.operational_date, morning.shift, tz).await?;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].stay_id, second_stay.id);
        assert!(log[0].carried_over);
        Ok(())
    }

    #[test]
    fn test_stay_log_night_shift_spans_midnight() {
        let check_in = Mexico_City
            .with_ymd_and_hms(2024, 5, 10, 22, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let released = Mexico_City
            .with_ymd_and_hms(2024, 5, 11, 3, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let stays = vec![stay::Model {
            id: 1,
            room_id: 1,
            customer_name: None,
            vehicle_plate: None,
            check_in_time: check_in,
            opened_at: check_in,
            released_at: Some(released),
            total_charged: 330.0,
        }];

        let log = stay_log(&stays, &[], date(10), Shift::Nocturno, Mexico_City);
        assert_eq!(log.len(), 1);
        assert!(!log[0].carried_over);
        assert_eq!(log[0].room_name, "1");

        assert!(stay_log(&stays, &[], date(11), Shift::Nocturno, Mexico_City).is_empty());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(330.0), "$330.00");
        assert_eq!(format_money(1250.5), "$1,250.50");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(-75.0), "-$75.00");
    }

    #[test]
    fn test_format_summary_lists_categories() {
        let summary = summarize(&[], &[], date(10), Shift::Vespertino);
        let text = format_summary(&summary);
        assert!(text.starts_with("Turno Vespertino del 2024-05-10"));
        assert!(text.contains("Utilidad:        $0.00"));
    }
}
