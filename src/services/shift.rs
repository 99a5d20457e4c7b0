// src/services/shift.rs

use chrono::{NaiveDate, NaiveTime};

use crate::{
    errors::{AppError, AppResult},
    models::{AttendanceRecord, Shift, ShiftAssignment, parse_clock_time},
};

/// A company's shift definitions. Falls back to `default_set()` when none are configured.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftCatalog {
    pub shifts: Vec<Shift>,
}

fn shift(id: &str, name: &str, start: &str, end: &str, color: &str) -> Shift {
    Shift {
        id: id.to_string(),
        name: name.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        color: color.to_string(),
    }
}

impl ShiftCatalog {
    pub fn default_set() -> Self {
        Self {
            shifts: vec![
                shift("pagi", "Shift Pagi", "08:00", "16:00", "#22c55e"),
                shift("siang", "Shift Siang", "12:00", "20:00", "#f59e0b"),
                shift("malam", "Shift Malam", "16:00", "00:00", "#6366f1"),
            ],
        }
    }

    pub fn or_default(shifts: Vec<Shift>) -> Self {
        if shifts.is_empty() {
            Self::default_set()
        } else {
            Self { shifts }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    pub fn validate(shifts: &[Shift]) -> AppResult<()> {
        for s in shifts {
            if s.id.trim().is_empty() || s.name.trim().is_empty() {
                return Err(AppError::Validation("Shift id and name are required".to_string()));
            }
            if parse_clock_time(&s.start_time).is_none() || parse_clock_time(&s.end_time).is_none()
            {
                return Err(AppError::Validation(format!(
                    "Shift '{}' needs HH:MM start and end times",
                    s.name
                )));
            }
        }
        let mut ids: Vec<&str> = shifts.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(AppError::Validation("Shift ids must be unique".to_string()));
        }
        Ok(())
    }
}

/// Minutes after the shift start (plus grace) that the employee clocked in. Never negative.
pub fn minutes_late(clock_in: NaiveTime, shift_start: NaiveTime, grace_minutes: u32) -> i64 {
    let late = (clock_in - shift_start).num_minutes() - i64::from(grace_minutes);
    late.max(0)
}

/// Lateness for a clock-in on `date`, if the employee had an assigned, known shift.
pub fn lateness_for(
    employee_id: &str,
    date: NaiveDate,
    clock_in: NaiveTime,
    assignments: &[ShiftAssignment],
    catalog: &ShiftCatalog,
    grace_minutes: u32,
) -> Option<i64> {
    let assignment = assignments
        .iter()
        .find(|a| a.employee_id == employee_id && a.date == date)?;
    let start = parse_clock_time(&catalog.get(&assignment.shift_id)?.start_time)?;
    Some(minutes_late(clock_in, start, grace_minutes))
}

/// On-time clock-ins vs clock-ins on days with an assigned shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PunctualityTally {
    pub on_time: u32,
    pub measured: u32,
}

impl PunctualityTally {
    pub fn score(&self) -> f64 {
        if self.measured == 0 {
            0.0
        } else {
            f64::from(self.on_time) / f64::from(self.measured) * 100.0
        }
    }
}

pub fn tally_punctuality(
    records: &[AttendanceRecord],
    assignments: &[ShiftAssignment],
    catalog: &ShiftCatalog,
    grace_minutes: u32,
) -> PunctualityTally {
    records
        .iter()
        .filter_map(|r| {
            let clock_in = r.clock_in_time()?;
            lateness_for(&r.employee_id, r.date, clock_in, assignments, catalog, grace_minutes)
        })
        .fold(PunctualityTally::default(), |mut tally, late| {
            tally.measured += 1;
            if late == 0 {
                tally.on_time += 1;
            }
            tally
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn assignment(d: u32, shift_id: &str) -> ShiftAssignment {
        ShiftAssignment {
            employee_id: "emp-1".to_string(),
            date: date(d),
            shift_id: shift_id.to_string(),
        }
    }

    fn present(d: u32, clock_in: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "emp-1".to_string(),
            date: date(d),
            status: AttendanceStatus::Present,
            clock_in: Some(clock_in.to_string()),
            clock_out: None,
            notes: None,
        }
    }

    #[test]
    fn early_and_grace_period_arrivals_are_not_late() {
        assert_eq!(minutes_late(time(7, 55), time(8, 0), 0), 0);
        assert_eq!(minutes_late(time(8, 4), time(8, 0), 5), 0);
        assert_eq!(minutes_late(time(8, 17), time(8, 0), 5), 12);
    }

    #[test]
    fn lateness_uses_assigned_shift() {
        let catalog = ShiftCatalog::default_set();
        let assignments = vec![assignment(3, "siang")];
        assert_eq!(
            lateness_for("emp-1", date(3), time(12, 30), &assignments, &catalog, 0),
            Some(30)
        );
        assert_eq!(
            lateness_for("emp-1", date(4), time(12, 30), &assignments, &catalog, 0),
            None
        );
    }

    #[test]
    fn unknown_shift_is_not_measured() {
        let catalog = ShiftCatalog::default_set();
        let assignments = vec![assignment(3, "retired")];
        assert_eq!(
            lateness_for("emp-1", date(3), time(9, 0), &assignments, &catalog, 0),
            None
        );
    }

    #[test]
    fn punctuality_counts_only_measured_days() {
        let catalog = ShiftCatalog::default_set();
        let assignments = vec![assignment(3, "pagi"), assignment(4, "pagi"), assignment(5, "pagi")];
        let records = vec![
            present(3, "07:58"),
            present(4, "08:20"),
            present(5, "08:00"),
            present(6, "11:00"),
        ];
        let tally = tally_punctuality(&records, &assignments, &catalog, 0);
        assert_eq!(tally, PunctualityTally { on_time: 2, measured: 3 });
        assert!((tally.score() - 66.666).abs() < 0.01);
        assert_eq!(PunctualityTally::default().score(), 0.0);
    }

    #[test]
    fn empty_catalog_falls_back_to_defaults() {
        assert_eq!(ShiftCatalog::or_default(Vec::new()), ShiftCatalog::default_set());
    }

    #[test]
    fn catalog_validation() {
        let mut shifts = ShiftCatalog::default_set().shifts;
        assert!(ShiftCatalog::validate(&shifts).is_ok());
        shifts.push(shift("pagi", "Duplicate", "09:00", "17:00", ""));
        assert!(ShiftCatalog::validate(&shifts).is_err());
        let broken = vec![shift("x", "Broken", "9am", "17:00", "")];
        assert!(ShiftCatalog::validate(&broken).is_err());
    }
}
