// src/services/leave.rs

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{AttendanceRecord, Employee, LeaveAdjustment},
    services::calendar::parse_flexible_date,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveBalance {
    pub employee_id: String,
    pub year: i32,
    pub eligible: bool,
    pub entitlement: i32,
    pub adjustments: i32,
    pub used: i32,
    pub remaining: i32,
}

/// Annual leave opens after twelve months of service.
pub fn leave_eligible(employee: &Employee, as_of: NaiveDate) -> bool {
    match parse_flexible_date(&employee.hire_date) {
        Some(hired) => hired
            .checked_add_months(Months::new(12))
            .is_some_and(|anniversary| anniversary <= as_of),
        None => true,
    }
}

/// Leave balance for `year`: entitlement plus ledger adjustments minus leave days taken.
pub fn leave_balance(
    employee: &Employee,
    year: i32,
    records: &[AttendanceRecord],
    ledger: &[LeaveAdjustment],
    annual_days: u32,
    as_of: NaiveDate,
) -> LeaveBalance {
    let eligible = leave_eligible(employee, as_of);
    let entitlement = if eligible {
        i32::try_from(annual_days).unwrap_or(i32::MAX)
    } else {
        0
    };
    let adjustments = ledger
        .iter()
        .filter(|a| a.employee_id == employee.id && a.year == year)
        .fold(0i32, |sum, a| sum.saturating_add(a.days));
    let used = records
        .iter()
        .filter(|r| r.employee_id == employee.id && r.date.year() == year && r.status.consumes_leave())
        .count() as i32;

    LeaveBalance {
        employee_id: employee.id.clone(),
        year,
        eligible,
        entitlement,
        adjustments,
        used,
        remaining: entitlement.saturating_add(adjustments).saturating_sub(used),
    }
}
