// src/handlers/leave.rs

use crate::{
    company::CompanyScope,
    errors::{AppError, AppResult},
    handlers::{require_employee, today, window_for},
    models::{LeaveAdjustment, YearQuery},
    services::{
        calendar::{DateWindow, calendar_month},
        leave::{LeaveBalance, leave_balance},
        settings::{append_leave_adjustment, load_leave_ledger},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Datelike;
use tracing::info;

/// Annual leave balance for one employee
#[utoipa::path(
    get,
    path = "/api/v1/leave/balances/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        YearQuery,
    ),
    responses(
        (status = 200, description = "Leave balance", body = LeaveBalance),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Leave"
)]
pub async fn get_leave_balance(
    company: CompanyScope,
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<LeaveBalance>> {
    let today = today();
    let year = query.year.unwrap_or_else(|| today.year());
    let january = window_for(calendar_month, year, 1)?;
    let december = window_for(calendar_month, year, 12)?;
    let whole_year = DateWindow {
        start: january.start,
        end: december.end,
    };

    let employee = require_employee(&state, &company.id, &employee_id).await?;
    let records = state.roster.attendance_between(&company.id, whole_year).await?;
    let ledger = load_leave_ledger(state.settings.as_ref(), &company.id).await?;

    Ok(Json(leave_balance(
        &employee,
        year,
        &records,
        &ledger,
        state.config.annual_leave_days,
        today,
    )))
}

/// Add a manual correction to an employee's leave balance
#[utoipa::path(
    post,
    path = "/api/v1/leave/adjustments",
    request_body = LeaveAdjustment,
    responses(
        (status = 201, description = "Adjustment recorded", body = LeaveAdjustment),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Leave"
)]
pub async fn add_leave_adjustment(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<LeaveAdjustment>,
) -> AppResult<(StatusCode, Json<LeaveAdjustment>)> {
    require_employee(&state, &company.id, &body.employee_id).await?;
    if body.days == 0 {
        return Err(AppError::Validation("days cannot be zero".to_string()));
    }

    append_leave_adjustment(state.settings.as_ref(), &company.id, body.clone()).await?;
    info!(
        company_id = %company.id,
        employee_id = %body.employee_id,
        year = body.year,
        days = body.days,
        "Leave adjustment recorded"
    );
    Ok((StatusCode::CREATED, Json(body)))
}
