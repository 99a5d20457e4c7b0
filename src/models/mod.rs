// src/models/mod.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub mod settings;

pub use settings::{
    DayName, KpiCriterion, KpiSystem, LeaveAdjustment, OfficeGeofence, StandardWeights,
    WeeklyHolidayMap,
};

// ─── Employee ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub company_id: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub division: String,
    /// Free text as entered by HR, e.g. "2023-04-17", "17/04/2023" or "17 April 2023".
    #[serde(default)]
    pub hire_date: String,
    #[serde(default)]
    pub salary: SalaryComponents,
    /// Lets this employee clock in from anywhere regardless of the office geofence.
    #[serde(default)]
    pub remote_attendance: bool,
}

impl Employee {
    pub fn capabilities(&self) -> RoleCapabilities {
        RoleCapabilities::from_title(&self.job_title)
    }
}

/// Role flags derived once from the free-text job title.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RoleCapabilities {
    /// Content creators are scored on monthly output.
    pub is_creator: bool,
    /// Hosts are scored on the revenue (GMV) of their streams.
    pub is_host: bool,
    /// Live-streaming hosts stream on Sundays.
    pub works_sundays: bool,
}

impl RoleCapabilities {
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        RoleCapabilities {
            is_creator: title.contains("creator"),
            is_host: title.contains("host"),
            works_sundays: title.contains("host live streaming"),
        }
    }
}

// ─── Salary ───────────────────────────────────────────────────────────────────

/// Monthly salary configuration in the smallest currency unit. Missing fields are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct SalaryComponents {
    pub base_salary: i64,
    pub allowances: Allowances,
    pub deductions: SalaryDeductions,
    pub bonus: i64,
    pub overtime: i64,
    pub holiday_bonus: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct Allowances {
    pub meal: i64,
    pub transport: i64,
    pub communication: i64,
    pub health: i64,
    pub position: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct SalaryDeductions {
    pub social_security: i64,
    pub income_tax: i64,
    /// Last absence deduction saved by an admin. Payroll recomputes the live
    /// figure from attendance and reports this one alongside for audit.
    pub absence: i64,
}

// ─── Attendance ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Sick,
    Leave,
    Absent,
    Holiday,
    Overtime,
    PaidLeave,
}

impl AttendanceStatus {
    /// Holiday and overtime entries do not account for a scheduled work day.
    pub fn covers_work_day(self) -> bool {
        !matches!(self, AttendanceStatus::Holiday | AttendanceStatus::Overtime)
    }

    pub fn consumes_leave(self) -> bool {
        matches!(self, AttendanceStatus::Leave | AttendanceStatus::PaidLeave)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// "HH:MM"
    #[serde(default)]
    pub clock_in: Option<String>,
    /// "HH:MM"
    #[serde(default)]
    pub clock_out: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    pub fn clock_in_time(&self) -> Option<NaiveTime> {
        self.clock_in.as_deref().and_then(parse_clock_time)
    }
}

/// Parses "HH:MM" (seconds tolerated). Garbage yields `None`.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

// ─── Shifts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Shift {
    pub id: String,
    pub name: String,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ShiftAssignment {
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift_id: String,
}

// ─── Output & Revenue ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct OutputRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    #[serde(default = "default_output_count")]
    pub count: u32,
}

fn default_output_count() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RevenueRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    /// Smallest currency unit.
    pub amount: i64,
}

// ─── Location ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
}

// ─── Requests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClockRequest {
    pub employee_id: String,
    /// Absent when the device could not produce a fix.
    #[serde(default)]
    pub fix: Option<GpsFix>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetKpiScoresRequest {
    /// Format: "YYYY-MM"
    pub period: String,
    pub employee_id: String,
    /// Criterion id → score in [0, 100].
    pub scores: std::collections::BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetShiftAssignmentsRequest {
    pub assignments: Vec<ShiftAssignment>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertEmployeeRequest {
    pub name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub hire_date: String,
    #[serde(default)]
    pub salary: SalaryComponents,
    #[serde(default)]
    pub remote_attendance: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct KpiConfigRequest {
    #[serde(default)]
    pub criteria: Vec<KpiCriterion>,
    #[serde(default)]
    pub weights: StandardWeights,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    /// Defaults to the current year.
    pub year: Option<i32>,
}

// ─── Responses ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ClockResponse {
    pub record: AttendanceRecord,
    /// `None` when the write was allowed by a remote override without a fix.
    pub distance_meters: Option<u64>,
    pub inside_radius: bool,
    pub remote: bool,
    pub minutes_late: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_match_titles_case_insensitively() {
        let caps = RoleCapabilities::from_title("Senior Host Live Streaming");
        assert!(caps.is_host);
        assert!(caps.works_sundays);
        assert!(!caps.is_creator);

        let caps = RoleCapabilities::from_title("Content CREATOR");
        assert!(caps.is_creator);
        assert!(!caps.is_host);
    }

    #[test]
    fn title_with_both_roles_keeps_both() {
        let caps = RoleCapabilities::from_title("Creator & Host");
        assert!(caps.is_creator && caps.is_host);
        assert!(!caps.works_sundays);
    }

    #[test]
    fn salary_fields_default_to_zero() {
        let salary: SalaryComponents =
            serde_json::from_str(r#"{"base_salary": 5000000, "allowances": {"meal": 300000}}"#)
                .unwrap();
        assert_eq!(salary.base_salary, 5_000_000);
        assert_eq!(salary.allowances.meal, 300_000);
        assert_eq!(salary.allowances.transport, 0);
        assert_eq!(salary.deductions, SalaryDeductions::default());
    }

    #[test]
    fn clock_time_tolerates_seconds_and_rejects_garbage() {
        assert_eq!(
            parse_clock_time("08:05"),
            NaiveTime::from_hms_opt(8, 5, 0)
        );
        assert_eq!(
            parse_clock_time(" 08:05:30 "),
            NaiveTime::from_hms_opt(8, 5, 30)
        );
        assert_eq!(parse_clock_time("late"), None);
    }

    #[test]
    fn holiday_and_overtime_do_not_cover_work_days() {
        assert!(!AttendanceStatus::Holiday.covers_work_day());
        assert!(!AttendanceStatus::Overtime.covers_work_day());
        assert!(AttendanceStatus::Sick.covers_work_day());
        assert!(AttendanceStatus::PaidLeave.consumes_leave());
    }
}
