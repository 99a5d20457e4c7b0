// src/handlers/mod.rs

pub mod attendance;
pub mod employee;
pub mod general;
pub mod kpi;
pub mod leave;
pub mod payroll;
pub mod settings;

use chrono::{Local, NaiveDate};

use crate::{
    errors::{AppError, AppResult},
    models::Employee,
    services::calendar::DateWindow,
    state::AppState,
};

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) async fn require_employee(
    state: &AppState,
    company_id: &str,
    employee_id: &str,
) -> AppResult<Employee> {
    state
        .roster
        .get_employee(company_id, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found")))
}

/// Resolves a window builder for a year/month query, rejecting impossible months.
pub(crate) fn window_for(
    build: fn(i32, u32) -> Option<DateWindow>,
    year: i32,
    month: u32,
) -> AppResult<DateWindow> {
    build(year, month)
        .ok_or_else(|| AppError::Validation(format!("{year}-{month:02} is not a valid month")))
}
