// src/openapi.rs

use crate::{
    models::{
        Allowances, AttendanceRecord, AttendanceStatus, ClockRequest, ClockResponse, DayName,
        Employee, GpsFix, KpiConfigRequest, KpiCriterion, KpiSystem, LeaveAdjustment,
        OfficeGeofence, OutputRecord, RevenueRecord, SalaryComponents, SalaryDeductions,
        SetKpiScoresRequest, SetShiftAssignmentsRequest, Shift, ShiftAssignment, StandardWeights,
        UpsertEmployeeRequest, WeeklyHolidayMap,
    },
    services::{
        absence::AbsenceSummary,
        calendar::DateWindow,
        kpi::{KpiComponent, KpiComponentKind, KpiScore},
        leave::LeaveBalance,
        payroll::{PayrollSummary, TakeHome},
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LiveOps Attendance API",
        version = "1.0.0",
        description = "Attendance verification and compensation engine for live-streaming teams. \
            Geofenced clock-in, unexcused-absence counting over the 29th-to-28th payroll month, \
            proportional salary deductions and weighted KPI ranking. Every request is scoped \
            to the company named in the `X-Company-Id` header.",
        license(name = "MIT")
    ),
    paths(
        // Employees
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::upsert_employee,
        // Attendance
        crate::handlers::attendance::clock_in,
        crate::handlers::attendance::clock_out,
        crate::handlers::attendance::upsert_attendance,
        crate::handlers::attendance::list_absences,
        // Payroll
        crate::handlers::payroll::list_payroll,
        crate::handlers::payroll::get_payroll,
        // Settings
        crate::handlers::settings::get_geofence,
        crate::handlers::settings::set_geofence,
        crate::handlers::settings::get_weekly_holidays,
        crate::handlers::settings::set_weekly_holidays,
        // Shifts
        crate::handlers::settings::get_shifts,
        crate::handlers::settings::set_shifts,
        crate::handlers::settings::set_shift_assignments,
        // KPI
        crate::handlers::kpi::get_kpi_config,
        crate::handlers::kpi::set_kpi_config,
        crate::handlers::kpi::set_kpi_scores,
        crate::handlers::kpi::add_output,
        crate::handlers::kpi::add_revenue,
        crate::handlers::kpi::kpi_ranking,
        // Leave
        crate::handlers::leave::get_leave_balance,
        crate::handlers::leave::add_leave_adjustment,
    ),
    components(
        schemas(
            Employee, UpsertEmployeeRequest, SalaryComponents, Allowances, SalaryDeductions,
            AttendanceRecord, AttendanceStatus, ClockRequest, ClockResponse, GpsFix,
            AbsenceSummary, DateWindow,
            PayrollSummary, TakeHome,
            OfficeGeofence, WeeklyHolidayMap, DayName,
            Shift, ShiftAssignment, SetShiftAssignmentsRequest,
            KpiSystem, KpiConfigRequest, KpiCriterion, StandardWeights, SetKpiScoresRequest,
            OutputRecord, RevenueRecord, KpiScore, KpiComponent, KpiComponentKind,
            LeaveAdjustment, LeaveBalance,
        )
    ),
    tags(
        (name = "Employees", description = "Roster and salary components"),
        (name = "Attendance", description = "Geofenced clock actions, corrections and absences"),
        (name = "Payroll", description = "Take-home pay after absence deductions"),
        (name = "Settings", description = "Office geofence and weekly holiday roster"),
        (name = "Shifts", description = "Shift catalog and assignments"),
        (name = "KPI", description = "KPI configuration, inputs and ranking"),
        (name = "Leave", description = "Annual leave balances and corrections"),
    )
)]
pub struct ApiDoc;
