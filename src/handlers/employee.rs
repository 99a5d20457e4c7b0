use crate::{
    company::CompanyScope,
    errors::{AppError, AppResult},
    handlers::require_employee,
    models::{Employee, UpsertEmployeeRequest},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

/// List the company's employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(("X-Company-Id" = Option<String>, Header, description = "Company scope")),
    responses(
        (status = 200, description = "List of employees", body = Vec<Employee>),
        (status = 400, description = "Invalid company id"),
    ),
    tag = "Employees"
)]
pub async fn list_employees(
    company: CompanyScope,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = state.roster.list_employees(&company.id).await?;
    Ok(Json(employees))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Employees"
)]
pub async fn get_employee(
    company: CompanyScope,
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> AppResult<Json<Employee>> {
    let employee = require_employee(&state, &company.id, &employee_id).await?;
    Ok(Json(employee))
}

/// Create or replace an employee, including salary components
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    request_body = UpsertEmployeeRequest,
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee saved", body = Employee),
        (status = 400, description = "Validation error"),
    ),
    tag = "Employees"
)]
pub async fn upsert_employee(
    company: CompanyScope,
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Json(body): Json<UpsertEmployeeRequest>,
) -> AppResult<Json<Employee>> {
    if employee_id.trim().is_empty() {
        return Err(AppError::Validation("Employee id is required".to_string()));
    }
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Employee name is required".to_string()));
    }
    let s = &body.salary;
    let a = &s.allowances;
    let amounts = [
        s.base_salary,
        a.meal,
        a.transport,
        a.communication,
        a.health,
        a.position,
        s.deductions.social_security,
        s.deductions.income_tax,
        s.deductions.absence,
        s.bonus,
        s.overtime,
        s.holiday_bonus,
    ];
    if amounts.iter().any(|amount| *amount < 0) {
        return Err(AppError::Validation(
            "Salary components cannot be negative".to_string(),
        ));
    }

    let employee = state
        .roster
        .upsert_employee(Employee {
            id: employee_id,
            name: body.name.trim().to_string(),
            company_id: company.id,
            job_title: body.job_title,
            division: body.division,
            hire_date: body.hire_date,
            salary: body.salary,
            remote_attendance: body.remote_attendance,
        })
        .await?;

    info!(
        company_id = %employee.company_id,
        employee_id = %employee.id,
        "Employee saved"
    );
    Ok(Json(employee))
}
