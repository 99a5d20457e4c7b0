// src/handlers/settings.rs

use crate::{
    company::CompanyScope,
    errors::{AppError, AppResult},
    handlers::today,
    models::{OfficeGeofence, SetShiftAssignmentsRequest, Shift, ShiftAssignment, WeeklyHolidayMap},
    services::settings::{
        load_geofence, load_shift_catalog, load_weekly_holidays, save_geofence,
        save_shift_catalog, save_weekly_holidays,
    },
    state::AppState,
};
use axum::{Json, extract::State};
use tracing::info;

/// Get the office geofence used for clock-in checks
#[utoipa::path(
    get,
    path = "/api/v1/settings/geofence",
    responses((status = 200, description = "Office geofence", body = OfficeGeofence)),
    tag = "Settings"
)]
pub async fn get_geofence(
    company: CompanyScope,
    State(state): State<AppState>,
) -> AppResult<Json<OfficeGeofence>> {
    Ok(Json(load_geofence(state.settings.as_ref(), &company.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings/geofence",
    request_body = OfficeGeofence,
    responses(
        (status = 200, description = "Geofence saved", body = OfficeGeofence),
        (status = 400, description = "Invalid coordinates or radius"),
    ),
    tag = "Settings"
)]
pub async fn set_geofence(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<OfficeGeofence>,
) -> AppResult<Json<OfficeGeofence>> {
    save_geofence(state.settings.as_ref(), &company.id, &body).await?;
    info!(
        company_id = %company.id,
        location = %body.name,
        radius_meters = body.radius_meters,
        allow_remote = body.allow_remote,
        "Geofence saved"
    );
    Ok(Json(body))
}

/// Get this week's holiday roster. A roster from an earlier week is reset first.
#[utoipa::path(
    get,
    path = "/api/v1/settings/weekly-holidays",
    responses((status = 200, description = "Weekly holidays", body = WeeklyHolidayMap)),
    tag = "Settings"
)]
pub async fn get_weekly_holidays(
    company: CompanyScope,
    State(state): State<AppState>,
) -> AppResult<Json<WeeklyHolidayMap>> {
    let map = load_weekly_holidays(state.settings.as_ref(), &company.id, today()).await?;
    Ok(Json(map))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings/weekly-holidays",
    request_body = WeeklyHolidayMap,
    responses(
        (status = 200, description = "Weekly holidays saved", body = WeeklyHolidayMap),
        (status = 400, description = "Empty employee name"),
    ),
    tag = "Settings"
)]
pub async fn set_weekly_holidays(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<WeeklyHolidayMap>,
) -> AppResult<Json<WeeklyHolidayMap>> {
    let map = save_weekly_holidays(state.settings.as_ref(), &company.id, body, today()).await?;
    Ok(Json(map))
}

/// Get the shift catalog (the default set when none is configured)
#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    responses((status = 200, description = "Shift catalog", body = Vec<Shift>)),
    tag = "Shifts"
)]
pub async fn get_shifts(
    company: CompanyScope,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Shift>>> {
    let catalog = load_shift_catalog(state.settings.as_ref(), &company.id).await?;
    Ok(Json(catalog.shifts))
}

#[utoipa::path(
    put,
    path = "/api/v1/shifts",
    request_body = Vec<Shift>,
    responses(
        (status = 200, description = "Shift catalog saved", body = Vec<Shift>),
        (status = 400, description = "Invalid shift definition"),
    ),
    tag = "Shifts"
)]
pub async fn set_shifts(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<Vec<Shift>>,
) -> AppResult<Json<Vec<Shift>>> {
    let catalog = save_shift_catalog(state.settings.as_ref(), &company.id, body).await?;
    Ok(Json(catalog.shifts))
}

/// Assign shifts to employees by date; an existing assignment for the same day is replaced
#[utoipa::path(
    put,
    path = "/api/v1/shifts/assignments",
    request_body = SetShiftAssignmentsRequest,
    responses(
        (status = 200, description = "Assignments saved", body = Vec<ShiftAssignment>),
        (status = 400, description = "Unknown shift"),
    ),
    tag = "Shifts"
)]
pub async fn set_shift_assignments(
    company: CompanyScope,
    State(state): State<AppState>,
    Json(body): Json<SetShiftAssignmentsRequest>,
) -> AppResult<Json<Vec<ShiftAssignment>>> {
    let catalog = load_shift_catalog(state.settings.as_ref(), &company.id).await?;
    if let Some(unknown) = body
        .assignments
        .iter()
        .find(|a| catalog.get(&a.shift_id).is_none())
    {
        return Err(AppError::Validation(format!(
            "Unknown shift '{}'",
            unknown.shift_id
        )));
    }

    state
        .roster
        .upsert_shift_assignments(&company.id, body.assignments.clone())
        .await?;
    Ok(Json(body.assignments))
}
