// src/routes/mod.rs

use crate::{
    handlers::{
        attendance::{clock_in, clock_out, list_absences, upsert_attendance},
        employee::{get_employee, list_employees, upsert_employee},
        kpi::{add_output, add_revenue, get_kpi_config, kpi_ranking, set_kpi_config, set_kpi_scores},
        leave::{add_leave_adjustment, get_leave_balance},
        payroll::{get_payroll, list_payroll},
        settings::{
            get_geofence, get_shifts, get_weekly_holidays, set_geofence, set_shift_assignments,
            set_shifts, set_weekly_holidays,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Employees ────────────────────────────────────────
        .route("/employees", get(list_employees))
        .route(
            "/employees/{employee_id}",
            get(get_employee).put(upsert_employee),
        )
        // ─── Attendance ───────────────────────────────────────
        .route("/attendance", put(upsert_attendance))
        .route("/attendance/clock-in", post(clock_in))
        .route("/attendance/clock-out", post(clock_out))
        .route("/attendance/absences", get(list_absences))
        // ─── Payroll ──────────────────────────────────────────
        .route("/payroll", get(list_payroll))
        .route("/payroll/{employee_id}", get(get_payroll))
        // ─── Settings ─────────────────────────────────────────
        .route("/settings/geofence", get(get_geofence).put(set_geofence))
        .route(
            "/settings/weekly-holidays",
            get(get_weekly_holidays).put(set_weekly_holidays),
        )
        // ─── Shifts ───────────────────────────────────────────
        .route("/shifts", get(get_shifts).put(set_shifts))
        .route("/shifts/assignments", put(set_shift_assignments))
        // ─── KPI ──────────────────────────────────────────────
        .route("/kpi/config", get(get_kpi_config).put(set_kpi_config))
        .route("/kpi/scores", put(set_kpi_scores))
        .route("/kpi/outputs", post(add_output))
        .route("/kpi/revenue", post(add_revenue))
        .route("/kpi/ranking", get(kpi_ranking))
        // ─── Leave ────────────────────────────────────────────
        .route("/leave/adjustments", post(add_leave_adjustment))
        .route("/leave/balances/{employee_id}", get(get_leave_balance))
}
