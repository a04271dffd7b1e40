// src/services/calendar.rs

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::models::{
    booking::{Booking, BookingDetail},
    calendar::{BookingPreview, CalendarDay, DayDetails, MonthCalendar},
    period::ReportPeriod,
};

/// Quantos registros aparecem dentro da célula antes do "+N".
pub const PREVIEW_SIZE: usize = 3;

/// Segunda-feira em/antes do dia 1 até o domingo em/depois do último dia.
pub fn grid_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let period = ReportPeriod::month(year, month)?;
    let first = period.start();
    let last = period.end();

    let lead = u64::from(first.weekday().num_days_from_monday());
    let trail = u64::from(6 - last.weekday().num_days_from_monday());

    let start = first
        .checked_sub_days(Days::new(lead))
        .ok_or_else(|| AppError::InvalidPeriod(format!("{}-{:02}", year, month)))?;
    let end = last
        .checked_add_days(Days::new(trail))
        .ok_or_else(|| AppError::InvalidPeriod(format!("{}-{:02}", year, month)))?;
    Ok((start, end))
}

fn sorted_by_time<'a>(bookings: impl Iterator<Item = &'a Booking>) -> Vec<&'a Booking> {
    let mut day: Vec<&Booking> = bookings.filter(|b| !b.is_canceled()).collect();
    // Horário em texto "HH:MM": ordem lexicográfica basta; sem horário vai primeiro
    day.sort_by(|a, b| a.time_key().cmp(b.time_key()));
    day
}

/// Monta a grade do mês. `bookings` deve cobrir todo o intervalo da grade
/// para que os dias dos meses vizinhos também venham preenchidos.
pub fn build_month_grid(
    year: i32,
    month: u32,
    bookings: &[Booking],
    today: NaiveDate,
) -> Result<MonthCalendar, AppError> {
    let (grid_start, grid_end) = grid_bounds(year, month)?;

    let days: Vec<CalendarDay> = grid_start
        .iter_days()
        .take_while(|d| *d <= grid_end)
        .map(|date| {
            let day = sorted_by_time(bookings.iter().filter(|b| b.date == date));
            let count = day.len();
            CalendarDay {
                date,
                in_month: date.month() == month && date.year() == year,
                is_today: date == today,
                count,
                total: day.iter().map(|b| b.total).sum(),
                preview: day
                    .iter()
                    .take(PREVIEW_SIZE)
                    .map(|b| BookingPreview {
                        id: b.id,
                        time: b.time.clone(),
                        name: b.name.clone(),
                    })
                    .collect(),
                more: count.saturating_sub(PREVIEW_SIZE),
                bookings: day.into_iter().map(BookingDetail::from).collect(),
            }
        })
        .collect();

    let in_month = days.iter().filter(|d| d.in_month);
    let (booking_count, month_total) = in_month.fold((0, Decimal::ZERO), |(n, t), d| (n + d.count, t + d.total));

    Ok(MonthCalendar {
        year,
        month,
        grid_start,
        grid_end,
        booking_count,
        month_total,
        days,
    })
}

pub fn day_details(date: NaiveDate, bookings: &[Booking]) -> DayDetails {
    let day = sorted_by_time(bookings.iter().filter(|b| b.date == date));
    DayDetails {
        date,
        total: day.iter().map(|b| b.total).sum(),
        bookings: day.into_iter().map(BookingDetail::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{fixtures::booking, BookingStatus};
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(mut b: Booking, time: &str) -> Booking {
        b.time = Some(time.to_string());
        b
    }

    #[test]
    fn grid_runs_monday_to_sunday_for_every_month() {
        for year in [2024, 2025, 2026] {
            for month in 1..=12 {
                let cal = build_month_grid(year, month, &[], date("2025-01-01")).unwrap();
                assert_eq!(cal.grid_start.weekday(), Weekday::Mon);
                assert_eq!(cal.grid_end.weekday(), Weekday::Sun);
                assert_eq!(cal.days.len() % 7, 0);

                let in_month: Vec<NaiveDate> =
                    cal.days.iter().filter(|d| d.in_month).map(|d| d.date).collect();
                let period = ReportPeriod::month(year, month).unwrap();
                let expected: Vec<NaiveDate> = period
                    .start()
                    .iter_days()
                    .take_while(|d| *d <= period.end())
                    .collect();
                assert_eq!(in_month, expected);
            }
        }
    }

    #[test]
    fn month_starting_on_monday_has_no_leading_days() {
        // setembro de 2025 começa numa segunda
        let (start, end) = grid_bounds(2025, 9).unwrap();
        assert_eq!(start, date("2025-09-01"));
        assert_eq!(end, date("2025-10-05"));
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(matches!(grid_bounds(2025, 13), Err(AppError::InvalidPeriod(_))));
        assert!(matches!(grid_bounds(2025, 0), Err(AppError::InvalidPeriod(_))));
    }

    #[test]
    fn cells_sort_by_time_and_cap_the_preview() {
        let mut canceled = at(booking("Gone", "0", "2025-03-10", 999, &[]), "08:00");
        canceled.status = BookingStatus::Canceled;
        let bookings = vec![
            at(booking("D", "4", "2025-03-10", 100, &[]), "16:00"),
            at(booking("A", "1", "2025-03-10", 100, &[]), "09:00"),
            at(booking("C", "3", "2025-03-10", 100, &[]), "12:30"),
            at(booking("B", "2", "2025-03-10", 100, &[]), "10:15"),
            canceled,
            at(booking("Prev", "5", "2025-02-24", 50, &[]), "10:00"),
        ];

        let cal = build_month_grid(2025, 3, &bookings, date("2025-03-10")).unwrap();
        let cell = cal.days.iter().find(|d| d.date == date("2025-03-10")).unwrap();

        assert!(cell.is_today);
        assert_eq!(cell.count, 4);
        assert_eq!(cell.total, Decimal::from(400));
        let names: Vec<&str> = cell.preview.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(cell.more, 1);
        assert_eq!(cell.bookings.len(), 4);

        // 24/02 aparece na grade de março, fora do mês
        let prev = cal.days.iter().find(|d| d.date == date("2025-02-24")).unwrap();
        assert!(!prev.in_month);
        assert_eq!(prev.count, 1);

        assert_eq!(cal.booking_count, 4);
        assert_eq!(cal.month_total, Decimal::from(400));
    }

    #[test]
    fn day_details_show_discounts() {
        let bookings = vec![
            at(booking("B", "2", "2025-03-10", 800, &[("Cleaning", 1000)]), "11:00"),
            at(booking("A", "1", "2025-03-10", 500, &[("X-ray", 500)]), "09:00"),
            at(booking("X", "9", "2025-03-11", 500, &[]), "09:00"),
        ];
        let day = day_details(date("2025-03-10"), &bookings);
        assert_eq!(day.bookings.len(), 2);
        assert_eq!(day.total, Decimal::from(1300));
        assert_eq!(day.bookings[0].name, "A");
        assert_eq!(day.bookings[1].discount, Decimal::from(200));
        assert!(day.bookings[1].has_coupon);
    }
}
