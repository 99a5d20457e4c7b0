// src/handlers/attendance.rs

use crate::{
    company::CompanyScope,
    errors::{AppError, AppResult},
    handlers::{require_employee, today, window_for},
    models::{
        AttendanceRecord, AttendanceStatus, ClockRequest, ClockResponse, PeriodQuery,
        parse_clock_time,
    },
    services::{
        absence::{AbsenceSummary, summarize_absences},
        calendar::{DateWindow, payroll_window},
        geo::{GeoClearance, authorize_clock},
        settings::{load_geofence, load_shift_catalog, load_weekly_holidays},
        shift::lateness_for,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Local, Utc};
use tracing::{info, warn};

#[derive(Clone, Copy)]
enum ClockAction {
    In,
    Out,
}

fn append_note(notes: Option<String>, extra: Option<String>) -> Option<String> {
    match (notes, extra) {
        (Some(n), Some(e)) if !n.trim().is_empty() => Some(format!("{n}; {e}")),
        (_, Some(e)) => Some(e),
        (n, None) => n,
    }
}

/// Notes after a clock-in. Lateness is noted only on the clock-in that set the day's time.
fn clock_in_notes(
    existing: Option<String>,
    submitted: Option<String>,
    first_clock_in: bool,
    minutes_late: Option<i64>,
) -> Option<String> {
    let late_note = minutes_late
        .filter(|m| first_clock_in && *m > 0)
        .map(|m| format!("Late {m} min"));
    append_note(append_note(existing, submitted), late_note)
}

async fn clock(
    company: CompanyScope,
    state: AppState,
    body: ClockRequest,
    action: ClockAction,
) -> AppResult<Json<ClockResponse>> {
    let employee = require_employee(&state, &company.id, &body.employee_id).await?;
    let geofence = load_geofence(state.settings.as_ref(), &company.id).await?;

    let verdict = authorize_clock(
        &employee,
        &geofence,
        body.fix.as_ref(),
        Utc::now(),
        state.config.location_max_fix_age,
    );
    let (clearance, check) = match verdict {
        Ok(v) => v,
        Err(e) => {
            warn!(company_id = %company.id, employee_id = %employee.id, error = %e, "Clock action refused");
            return Err(e);
        }
    };

    let now = Local::now();
    let date = now.date_naive();
    let time = now.time().format("%H:%M").to_string();
    let existing = state
        .roster
        .attendance_on(&company.id, &employee.id, date)
        .await?;

    let mut minutes_late = None;
    let record = match action {
        ClockAction::In => {
            let mut record = existing.unwrap_or_else(|| AttendanceRecord {
                employee_id: employee.id.clone(),
                date,
                status: AttendanceStatus::Present,
                clock_in: None,
                clock_out: None,
                notes: None,
            });
            // A repeated clock-in keeps the first time of the day.
            let first_clock_in = record.clock_in.is_none();
            if first_clock_in {
                record.clock_in = Some(time);
            }
            record.status = AttendanceStatus::Present;

            if let Some(clock_in) = record.clock_in_time() {
                let day = DateWindow { start: date, end: date };
                let assignments = state
                    .roster
                    .shift_assignments_between(&company.id, day)
                    .await?;
                let catalog = load_shift_catalog(state.settings.as_ref(), &company.id).await?;
                minutes_late = lateness_for(
                    &employee.id,
                    date,
                    clock_in,
                    &assignments,
                    &catalog,
                    state.config.late_grace_minutes,
                );
            }
            record.notes = clock_in_notes(record.notes, body.notes, first_clock_in, minutes_late);
            record
        }
        ClockAction::Out => {
            let mut record = existing
                .filter(|r| r.clock_in.is_some())
                .ok_or_else(|| AppError::BadRequest("No clock-in recorded today".to_string()))?;
            record.clock_out = Some(time);
            record.notes = append_note(record.notes, body.notes);
            record
        }
    };

    let record = state.roster.upsert_attendance(&company.id, record).await?;
    info!(
        company_id = %company.id,
        employee_id = %employee.id,
        date = %date,
        distance_meters = ?check.map(|c| c.distance_meters),
        clearance = ?clearance,
        "Attendance recorded"
    );

    Ok(Json(ClockResponse {
        record,
        distance_meters: check.map(|c| c.distance_meters),
        inside_radius: check.is_some_and(|c| c.inside_radius),
        remote: clearance != GeoClearance::Onsite,
        minutes_late,
    }))
}

/// Clock in for today, subject to the office geofence
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Clock-in recorded", body = ClockResponse),
        (status = 403, description = "Outside the office radius"),
        (status = 404, description = "Employee not found"),
        (status = 422, description = "No usable GPS fix"),
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<ClockRequest>,
) -> AppResult<Json<ClockResponse>> {
    clock(company, state, body, ClockAction::In).await
}

/// Clock out for today, subject to the office geofence
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Clock-out recorded", body = ClockResponse),
        (status = 400, description = "No clock-in today"),
        (status = 403, description = "Outside the office radius"),
        (status = 422, description = "No usable GPS fix"),
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<ClockRequest>,
) -> AppResult<Json<ClockResponse>> {
    clock(company, state, body, ClockAction::Out).await
}

/// Admin correction: create or replace the record for an employee and date
#[utoipa::path(
    put,
    path = "/api/v1/attendance",
    request_body = AttendanceRecord,
    responses(
        (status = 200, description = "Record saved", body = AttendanceRecord),
        (status = 400, description = "Invalid clock time"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Attendance"
)]
pub async fn upsert_attendance(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<AttendanceRecord>,
) -> AppResult<Json<AttendanceRecord>> {
    require_employee(&state, &company.id, &body.employee_id).await?;
    for (label, value) in [("clock_in", &body.clock_in), ("clock_out", &body.clock_out)] {
        if let Some(raw) = value {
            if parse_clock_time(raw).is_none() {
                return Err(AppError::Validation(format!("{label} must be HH:MM")));
            }
        }
    }

    let record = state.roster.upsert_attendance(&company.id, body).await?;
    info!(
        company_id = %company.id,
        employee_id = %record.employee_id,
        date = %record.date,
        status = ?record.status,
        "Attendance corrected"
    );
    Ok(Json(record))
}

/// Unexcused absences per employee for a payroll month (29th to 28th)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/absences",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Absence summaries", body = Vec<AbsenceSummary>),
        (status = 400, description = "Invalid month"),
    ),
    tag = "Attendance"
)]
pub async fn list_absences(
    company: CompanyScope,
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<AbsenceSummary>>> {
    let window = window_for(payroll_window, period.year, period.month)?;
    let today = today();
    let employees = state.roster.list_employees(&company.id).await?;
    let records = state.roster.attendance_between(&company.id, window).await?;
    let holidays = load_weekly_holidays(state.settings.as_ref(), &company.id, today).await?;

    let summaries = employees
        .iter()
        .map(|e| {
            summarize_absences(
                e,
                window,
                &records,
                state.config.attendance_cutover_date,
                today,
                &holidays,
            )
        })
        .collect();
    Ok(Json(summaries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_joined() {
        assert_eq!(append_note(None, None), None);
        assert_eq!(
            append_note(Some("WFH".to_string()), Some("Late 5 min".to_string())),
            Some("WFH; Late 5 min".to_string())
        );
        assert_eq!(
            append_note(Some("  ".to_string()), Some("Late 5 min".to_string())),
            Some("Late 5 min".to_string())
        );
        assert_eq!(append_note(Some("WFH".to_string()), None), Some("WFH".to_string()));
    }

    #[test]
    fn lateness_is_noted_despite_free_text_mentioning_late() {
        let notes = clock_in_notes(None, Some("Late train".to_string()), true, Some(12));
        assert_eq!(notes, Some("Late train; Late 12 min".to_string()));
    }

    #[test]
    fn repeated_clock_in_does_not_repeat_lateness() {
        let first = clock_in_notes(None, None, true, Some(12));
        assert_eq!(first, Some("Late 12 min".to_string()));
        let again = clock_in_notes(first.clone(), None, false, Some(12));
        assert_eq!(again, first);
    }

    #[test]
    fn on_time_clock_in_adds_no_note() {
        assert_eq!(clock_in_notes(None, None, true, Some(0)), None);
        assert_eq!(clock_in_notes(None, None, true, None), None);
    }
}
