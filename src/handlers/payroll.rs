// src/handlers/payroll.rs

use crate::{
    company::CompanyScope,
    errors::AppResult,
    handlers::{require_employee, today, window_for},
    models::PeriodQuery,
    services::{
        absence::summarize_absences,
        calendar::payroll_window,
        payroll::{PayrollService, PayrollSummary},
        settings::load_weekly_holidays,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::info;

/// Take-home pay for every employee in a payroll month
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Payroll summaries", body = Vec<PayrollSummary>),
        (status = 400, description = "Invalid month"),
    ),
    tag = "Payroll"
)]
pub async fn list_payroll(
    company: CompanyScope,
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<PayrollSummary>>> {
    let window = window_for(payroll_window, period.year, period.month)?;
    let today = today();
    let employees = state.roster.list_employees(&company.id).await?;
    let records = state.roster.attendance_between(&company.id, window).await?;
    let holidays = load_weekly_holidays(state.settings.as_ref(), &company.id, today).await?;

    let summaries: Vec<PayrollSummary> = employees
        .iter()
        .map(|employee| {
            let absences = summarize_absences(
                employee,
                window,
                &records,
                state.config.attendance_cutover_date,
                today,
                &holidays,
            );
            PayrollService::summarize(employee, &absences)
        })
        .collect();

    let total: i64 = summaries
        .iter()
        .fold(0i64, |sum, s| sum.saturating_add(s.breakdown.take_home));
    info!(
        company_id = %company.id,
        year = period.year,
        month = period.month,
        employees = summaries.len(),
        total_take_home = total,
        "Payroll computed"
    );
    Ok(Json(summaries))
}

/// Take-home pay for one employee in a payroll month
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        PeriodQuery,
    ),
    responses(
        (status = 200, description = "Payroll summary", body = PayrollSummary),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    company: CompanyScope,
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<PayrollSummary>> {
    let window = window_for(payroll_window, period.year, period.month)?;
    let today = today();
    let employee = require_employee(&state, &company.id, &employee_id).await?;
    let records = state.roster.attendance_between(&company.id, window).await?;
    let holidays = load_weekly_holidays(state.settings.as_ref(), &company.id, today).await?;

    let absences = summarize_absences(
        &employee,
        window,
        &records,
        state.config.attendance_cutover_date,
        today,
        &holidays,
    );
    Ok(Json(PayrollService::summarize(&employee, &absences)))
}
