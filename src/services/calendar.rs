// src/services/calendar.rs

use chrono::{DateTime, Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{DayName, Employee, WeeklyHolidayMap};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// `day` of the given month, letting days past the month's end roll into the
/// next month (Feb 29 of a common year is Mar 1).
fn overflow_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(day) - 1))
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

fn straddling_window(year: i32, month: u32, start_day: u32, end_day: u32) -> Option<DateWindow> {
    let (prev_year, prev_month) = previous_month(year, month);
    Some(DateWindow {
        start: overflow_date(prev_year, prev_month, start_day)?,
        end: overflow_date(year, month, end_day)?,
    })
}

/// Payroll month: the 29th of the previous month through the 28th of `month`.
pub fn payroll_window(year: i32, month: u32) -> Option<DateWindow> {
    straddling_window(year, month, 29, 28)
}

/// KPI output month: the 26th of the previous month through the 25th of `month`.
pub fn output_window(year: i32, month: u32) -> Option<DateWindow> {
    straddling_window(year, month, 26, 25)
}

pub fn calendar_month(year: i32, month: u32) -> Option<DateWindow> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some(DateWindow { start, end })
}

/// Whether `employee` is expected at work on `date`.
///
/// An employee listed anywhere in the weekly roster follows it strictly.
/// Everyone else gets weekends off, except live-streaming hosts who work Sundays.
pub fn is_work_day(date: NaiveDate, employee: &Employee, holidays: &WeeklyHolidayMap) -> bool {
    if holidays.lists(&employee.name) {
        return !holidays.is_off(&employee.name, DayName::from(date.weekday()));
    }

    match date.weekday() {
        Weekday::Sat => false,
        Weekday::Sun => employee.capabilities().works_sundays,
        _ => true,
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y", "%d %B %Y", "%d %b %Y",
    "%B %d, %Y",
];

const INDONESIAN_MONTHS: &[(&str, &str)] = &[
    ("januari", "January"),
    ("februari", "February"),
    ("maret", "March"),
    ("mei", "May"),
    ("juni", "June"),
    ("juli", "July"),
    ("agustus", "August"),
    ("oktober", "October"),
    ("desember", "December"),
];

/// Parses the date formats HR actually types. `None` means "leave it out".
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }

    let lowered = raw.to_lowercase();
    let translated = INDONESIAN_MONTHS
        .iter()
        .find(|(local, _)| lowered.contains(local))
        .map(|(local, english)| lowered.replace(local, english))?;
    NaiveDate::parse_from_str(&translated, "%d %B %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalaryComponents;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(name: &str, title: &str) -> Employee {
        Employee {
            id: format!("id-{name}"),
            name: name.to_string(),
            company_id: "acme".to_string(),
            job_title: title.to_string(),
            division: String::new(),
            hire_date: String::new(),
            salary: SalaryComponents::default(),
            remote_attendance: false,
        }
    }

    #[test]
    fn payroll_window_spans_29th_to_28th() {
        let window = payroll_window(2025, 5).unwrap();
        assert_eq!(window.start, date(2025, 4, 29));
        assert_eq!(window.end, date(2025, 5, 28));
        assert_eq!(window.days().count(), 30);
    }

    #[test]
    fn payroll_window_crosses_the_year() {
        let window = payroll_window(2025, 1).unwrap();
        assert_eq!(window.start, date(2024, 12, 29));
        assert_eq!(window.end, date(2025, 1, 28));
    }

    #[test]
    fn payroll_window_overflows_short_february() {
        let window = payroll_window(2025, 3).unwrap();
        assert_eq!(window.start, date(2025, 3, 1));
        assert_eq!(window.end, date(2025, 3, 28));

        let leap = payroll_window(2024, 3).unwrap();
        assert_eq!(leap.start, date(2024, 2, 29));
    }

    #[test]
    fn output_window_spans_26th_to_25th() {
        let window = output_window(2025, 3).unwrap();
        assert_eq!(window.start, date(2025, 2, 26));
        assert_eq!(window.end, date(2025, 3, 25));
        assert!(window.contains(date(2025, 3, 1)));
        assert!(!window.contains(date(2025, 3, 26)));
    }

    #[test]
    fn calendar_month_handles_december() {
        let window = calendar_month(2024, 12).unwrap();
        assert_eq!(window.start, date(2024, 12, 1));
        assert_eq!(window.end, date(2024, 12, 31));
        assert!(calendar_month(2024, 13).is_none());
    }

    #[test]
    fn weekends_are_off_by_default() {
        let staff = employee("Budi", "Admin Gudang");
        let holidays = WeeklyHolidayMap::default();
        assert!(is_work_day(date(2025, 3, 7), &staff, &holidays)); // Friday
        assert!(!is_work_day(date(2025, 3, 8), &staff, &holidays)); // Saturday
        assert!(!is_work_day(date(2025, 3, 9), &staff, &holidays)); // Sunday
    }

    #[test]
    fn streaming_hosts_work_sundays() {
        let host = employee("Rina", "Host Live Streaming");
        let holidays = WeeklyHolidayMap::default();
        assert!(is_work_day(date(2025, 3, 9), &host, &holidays));
        assert!(!is_work_day(date(2025, 3, 8), &host, &holidays));
    }

    #[test]
    fn roster_overrides_weekend_rule() {
        let host = employee("Rina", "Host Live Streaming");
        let mut holidays = WeeklyHolidayMap::empty_for(date(2025, 3, 3));
        holidays
            .days
            .entry(DayName::Rabu)
            .or_default()
            .insert("rina".to_string());

        assert!(!is_work_day(date(2025, 3, 5), &host, &holidays)); // Wednesday off
        assert!(is_work_day(date(2025, 3, 8), &host, &holidays)); // Saturday on
        assert!(is_work_day(date(2025, 3, 9), &host, &holidays)); // Sunday on
    }

    #[test]
    fn parses_tolerated_hire_date_formats() {
        let expected = Some(date(2023, 4, 17));
        assert_eq!(parse_flexible_date("2023-04-17"), expected);
        assert_eq!(parse_flexible_date("17/04/2023"), expected);
        assert_eq!(parse_flexible_date("17-04-2023"), expected);
        assert_eq!(parse_flexible_date("2023/04/17"), expected);
        assert_eq!(parse_flexible_date("17 April 2023"), expected);
        assert_eq!(parse_flexible_date("17 Apr 2023"), expected);
        assert_eq!(parse_flexible_date("2023-04-17T08:00:00+07:00"), expected);
        assert_eq!(parse_flexible_date("17 Agustus 2023"), Some(date(2023, 8, 17)));
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("sejak lama"), None);
        assert_eq!(parse_flexible_date("31/02/2023"), None);
    }
}
