// src/services/absence.rs

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{AttendanceRecord, Employee, WeeklyHolidayMap},
    services::calendar::{DateWindow, is_work_day, parse_flexible_date},
};

/// Absence tally for one employee over one window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AbsenceSummary {
    pub employee_id: String,
    pub employee_name: String,
    pub window: DateWindow,
    pub floor_date: NaiveDate,
    pub absences: u32,
    pub absent_dates: Vec<NaiveDate>,
}

/// The first date absences may count from: the system cutover, or the hire
/// date if it is later and parses. An unreadable hire date is ignored.
pub fn effective_floor(cutover: NaiveDate, employee: &Employee) -> NaiveDate {
    match parse_flexible_date(&employee.hire_date) {
        Some(hired) if hired > cutover => hired,
        _ => cutover,
    }
}

/// Work days in `window` without a record that covers them.
///
/// Days before `floor`, after `today`, or off per the work-day rules are skipped.
/// A day counts as absent when the employee has no record for it, or only
/// holiday/overtime records.
pub fn unexcused_absence_dates(
    employee: &Employee,
    window: DateWindow,
    records: &[AttendanceRecord],
    floor: NaiveDate,
    today: NaiveDate,
    holidays: &WeeklyHolidayMap,
) -> Vec<NaiveDate> {
    window
        .days()
        .filter(|d| *d >= floor && *d <= today)
        .filter(|d| is_work_day(*d, employee, holidays))
        .filter(|d| {
            !records
                .iter()
                .filter(|r| r.employee_id == employee.id && r.date == *d)
                .any(|r| r.status.covers_work_day())
        })
        .collect()
}

pub fn count_unexcused_absences(
    employee: &Employee,
    window: DateWindow,
    records: &[AttendanceRecord],
    floor: NaiveDate,
    today: NaiveDate,
    holidays: &WeeklyHolidayMap,
) -> u32 {
    unexcused_absence_dates(employee, window, records, floor, today, holidays).len() as u32
}

pub fn summarize_absences(
    employee: &Employee,
    window: DateWindow,
    records: &[AttendanceRecord],
    cutover: NaiveDate,
    today: NaiveDate,
    holidays: &WeeklyHolidayMap,
) -> AbsenceSummary {
    let floor_date = effective_floor(cutover, employee);
    let absent_dates = unexcused_absence_dates(employee, window, records, floor_date, today, holidays);
    AbsenceSummary {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        window,
        floor_date,
        absences: absent_dates.len() as u32,
        absent_dates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, SalaryComponents};
    use crate::services::calendar::payroll_window;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn staff(hire_date: &str) -> Employee {
        Employee {
            id: "emp-7".to_string(),
            name: "Budi".to_string(),
            company_id: "acme".to_string(),
            job_title: "Admin Gudang".to_string(),
            division: "Ops".to_string(),
            hire_date: hire_date.to_string(),
            salary: SalaryComponents::default(),
            remote_attendance: false,
        }
    }

    fn record(d: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "emp-7".to_string(),
            date: d,
            status,
            clock_in: None,
            clock_out: None,
            notes: None,
        }
    }

    /// Mon 3 Mar – Sun 9 Mar 2025: five work days for a weekday employee.
    fn week() -> DateWindow {
        DateWindow {
            start: date(2025, 3, 3),
            end: date(2025, 3, 9),
        }
    }

    #[test]
    fn every_missing_work_day_counts() {
        let count = count_unexcused_absences(
            &staff(""),
            week(),
            &[],
            date(2025, 1, 1),
            date(2025, 3, 31),
            &WeeklyHolidayMap::default(),
        );
        assert_eq!(count, 5);
    }

    #[test]
    fn window_before_floor_counts_nothing() {
        let count = count_unexcused_absences(
            &staff(""),
            week(),
            &[],
            date(2025, 4, 1),
            date(2025, 4, 30),
            &WeeklyHolidayMap::default(),
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn future_days_are_not_absences() {
        let count = count_unexcused_absences(
            &staff(""),
            week(),
            &[],
            date(2025, 1, 1),
            date(2025, 3, 4),
            &WeeklyHolidayMap::default(),
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn holiday_and_overtime_records_do_not_excuse() {
        let records = vec![
            record(date(2025, 3, 3), AttendanceStatus::Holiday),
            record(date(2025, 3, 4), AttendanceStatus::Overtime),
            record(date(2025, 3, 5), AttendanceStatus::Present),
            record(date(2025, 3, 6), AttendanceStatus::Sick),
            record(date(2025, 3, 7), AttendanceStatus::PaidLeave),
        ];
        let dates = unexcused_absence_dates(
            &staff(""),
            week(),
            &records,
            date(2025, 1, 1),
            date(2025, 3, 31),
            &WeeklyHolidayMap::default(),
        );
        assert_eq!(dates, vec![date(2025, 3, 3), date(2025, 3, 4)]);
    }

    #[test]
    fn other_employees_records_are_ignored() {
        let mut foreign = record(date(2025, 3, 3), AttendanceStatus::Present);
        foreign.employee_id = "emp-8".to_string();
        let count = count_unexcused_absences(
            &staff(""),
            week(),
            &[foreign],
            date(2025, 1, 1),
            date(2025, 3, 31),
            &WeeklyHolidayMap::default(),
        );
        assert_eq!(count, 5);
    }

    #[test]
    fn later_hire_date_raises_the_floor() {
        let employee = staff("05/03/2025");
        assert_eq!(effective_floor(date(2025, 1, 1), &employee), date(2025, 3, 5));

        let summary = summarize_absences(
            &employee,
            week(),
            &[],
            date(2025, 1, 1),
            date(2025, 3, 31),
            &WeeklyHolidayMap::default(),
        );
        assert_eq!(summary.absences, 3);
        assert_eq!(summary.floor_date, date(2025, 3, 5));
    }

    #[test]
    fn unreadable_hire_date_keeps_cutover_floor() {
        assert_eq!(
            effective_floor(date(2025, 1, 1), &staff("kemarin")),
            date(2025, 1, 1)
        );
    }

    #[test]
    fn full_payroll_month_for_weekday_staff() {
        // 29 Mar – 28 Apr 2025 holds 21 weekdays.
        let window = payroll_window(2025, 4).unwrap();
        let count = count_unexcused_absences(
            &staff(""),
            window,
            &[],
            date(2025, 1, 1),
            date(2025, 12, 31),
            &WeeklyHolidayMap::default(),
        );
        assert_eq!(count, 21);
    }
}
