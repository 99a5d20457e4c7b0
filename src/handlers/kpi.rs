// src/handlers/kpi.rs

use crate::{
    company::CompanyScope,
    errors::{AppError, AppResult},
    handlers::{require_employee, window_for},
    models::{
        KpiConfigRequest, KpiSystem, OutputRecord, PeriodQuery, RevenueRecord, SetKpiScoresRequest,
    },
    services::{
        calendar::{calendar_month, output_window},
        kpi::{KpiInputs, KpiScore, PunctualityInputs, rank, score_employee},
        settings::{load_kpi_system, load_shift_catalog, save_kpi_system},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::{info, warn};

/// Get the KPI configuration and entered manual scores
#[utoipa::path(
    get,
    path = "/api/v1/kpi/config",
    responses((status = 200, description = "KPI system", body = KpiSystem)),
    tag = "KPI"
)]
pub async fn get_kpi_config(
    company: CompanyScope,
    State(state): State<AppState>,
) -> AppResult<Json<KpiSystem>> {
    let system = load_kpi_system(state.settings.as_ref(), &company.id).await?;
    Ok(Json(system))
}

/// Replace the standard weights and manual criteria. Entered scores are kept.
#[utoipa::path(
    put,
    path = "/api/v1/kpi/config",
    request_body = KpiConfigRequest,
    responses(
        (status = 200, description = "KPI system saved", body = KpiSystem),
        (status = 400, description = "Weight out of range"),
    ),
    tag = "KPI"
)]
pub async fn set_kpi_config(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<KpiConfigRequest>,
) -> AppResult<Json<KpiSystem>> {
    let system = load_kpi_system(state.settings.as_ref(), &company.id)
        .await?
        .with_configuration(body.criteria, body.weights);
    save_kpi_system(state.settings.as_ref(), &company.id, &system).await?;

    info!(
        company_id = %company.id,
        criteria = system.criteria.len(),
        "KPI configuration saved"
    );
    Ok(Json(system))
}

/// Enter manual criterion scores for one employee and period
#[utoipa::path(
    put,
    path = "/api/v1/kpi/scores",
    request_body = SetKpiScoresRequest,
    responses(
        (status = 200, description = "Scores saved", body = KpiSystem),
        (status = 400, description = "Unknown criterion, bad period or score out of range"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "KPI"
)]
pub async fn set_kpi_scores(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<SetKpiScoresRequest>,
) -> AppResult<Json<KpiSystem>> {
    require_employee(&state, &company.id, &body.employee_id).await?;
    let mut system = load_kpi_system(state.settings.as_ref(), &company.id).await?;
    system.set_scores(&body.period, &body.employee_id, body.scores)?;
    save_kpi_system(state.settings.as_ref(), &company.id, &system).await?;
    Ok(Json(system))
}

/// Record produced content for a creator
#[utoipa::path(
    post,
    path = "/api/v1/kpi/outputs",
    request_body = OutputRecord,
    responses(
        (status = 201, description = "Output recorded", body = OutputRecord),
        (status = 404, description = "Employee not found"),
    ),
    tag = "KPI"
)]
pub async fn add_output(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<OutputRecord>,
) -> AppResult<(StatusCode, Json<OutputRecord>)> {
    require_employee(&state, &company.id, &body.employee_id).await?;
    if body.count == 0 {
        return Err(AppError::Validation("count must be at least 1".to_string()));
    }
    state.roster.add_output(&company.id, body.clone()).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Record live-streaming revenue (GMV) for a host
#[utoipa::path(
    post,
    path = "/api/v1/kpi/revenue",
    request_body = RevenueRecord,
    responses(
        (status = 201, description = "Revenue recorded", body = RevenueRecord),
        (status = 400, description = "Negative amount"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "KPI"
)]
pub async fn add_revenue(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<RevenueRecord>,
) -> AppResult<(StatusCode, Json<RevenueRecord>)> {
    require_employee(&state, &company.id, &body.employee_id).await?;
    if body.amount < 0 {
        return Err(AppError::Validation("amount cannot be negative".to_string()));
    }
    state.roster.add_revenue(&company.id, body.clone()).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Weighted KPI scores for a month, best first
#[utoipa::path(
    get,
    path = "/api/v1/kpi/ranking",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Ranked KPI scores", body = Vec<KpiScore>),
        (status = 400, description = "Invalid month"),
    ),
    tag = "KPI"
)]
pub async fn kpi_ranking(
    company: CompanyScope,
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<KpiScore>>> {
    let (year, month) = (period.year, period.month);
    let month_window = window_for(calendar_month, year, month)?;
    let outputs_window = window_for(output_window, year, month)?;

    let employees = state.roster.list_employees(&company.id).await?;
    let system = load_kpi_system(state.settings.as_ref(), &company.id).await?;
    let attendance = state.roster.attendance_between(&company.id, month_window).await?;
    let outputs = state.roster.outputs_between(&company.id, outputs_window).await?;
    let revenue = state.roster.revenue_between(&company.id, month_window).await?;
    let assignments = state
        .roster
        .shift_assignments_between(&company.id, month_window)
        .await?;
    let catalog = load_shift_catalog(state.settings.as_ref(), &company.id).await?;

    let punctuality = (!assignments.is_empty()).then_some(PunctualityInputs {
        assignments: &assignments,
        catalog: &catalog,
        grace_minutes: state.config.late_grace_minutes,
    });
    let inputs = KpiInputs {
        year,
        month,
        attendance: &attendance,
        outputs: &outputs,
        revenue: &revenue,
        weights: &system.weights,
        criteria: &system.criteria,
        punctuality,
    };

    let scores: Vec<KpiScore> = employees
        .iter()
        .map(|e| score_employee(e, &inputs, &system.manual_scores(year, month, &e.id)))
        .collect();

    let misconfigured = scores.iter().filter(|s| s.misconfigured).count();
    if misconfigured > 0 {
        warn!(
            company_id = %company.id,
            misconfigured,
            "Employees without any applicable KPI weight"
        );
    }
    Ok(Json(rank(scores)))
}
