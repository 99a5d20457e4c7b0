use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// (group, method, path, summary) for every route under `/api/v1`.
const ROUTES: &[(&str, &str, &str, &str)] = &[
    ("Employees", "GET", "/employees", "List the company roster"),
    ("Employees", "GET", "/employees/{id}", "Get one employee"),
    ("Employees", "PUT", "/employees/{id}", "Create or replace an employee"),
    ("Attendance", "POST", "/attendance/clock-in", "Geofenced clock-in"),
    ("Attendance", "POST", "/attendance/clock-out", "Geofenced clock-out"),
    ("Attendance", "PUT", "/attendance", "Admin correction for a day"),
    ("Attendance", "GET", "/attendance/absences?year&month", "Unexcused absences in a payroll month"),
    ("Payroll", "GET", "/payroll?year&month", "Take-home pay for everyone"),
    ("Payroll", "GET", "/payroll/{id}?year&month", "Take-home pay for one employee"),
    ("KPI", "GET", "/kpi/config", "Weights and manual criteria"),
    ("KPI", "PUT", "/kpi/config", "Replace weights and criteria"),
    ("KPI", "PUT", "/kpi/scores", "Enter manual scores"),
    ("KPI", "POST", "/kpi/outputs", "Record creator output"),
    ("KPI", "POST", "/kpi/revenue", "Record host GMV"),
    ("KPI", "GET", "/kpi/ranking?year&month", "Ranked KPI scores"),
    ("Settings", "GET", "/settings/geofence", "Office location and radius"),
    ("Settings", "PUT", "/settings/geofence", "Update the geofence"),
    ("Settings", "GET", "/settings/weekly-holidays", "This week's day-off roster"),
    ("Settings", "PUT", "/settings/weekly-holidays", "Replace the roster"),
    ("Shifts", "GET", "/shifts", "Shift catalog"),
    ("Shifts", "PUT", "/shifts", "Replace the shift catalog"),
    ("Shifts", "PUT", "/shifts/assignments", "Assign shifts by date"),
    ("Leave", "GET", "/leave/balances/{id}?year", "Annual leave balance"),
    ("Leave", "POST", "/leave/adjustments", "Manual leave correction"),
];

fn landing_page() -> String {
    let mut rows = String::new();
    let mut group = "";
    for (g, method, path, summary) in ROUTES {
        if *g != group {
            group = *g;
            rows.push_str(&format!("<tr><th colspan=\"3\">{g}</th></tr>\n"));
        }
        let path = path.replace('&', "&amp;");
        rows.push_str(&format!(
            "<tr><td>{method}</td><td><code>/api/v1{path}</code></td><td>{summary}</td></tr>\n"
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>LiveOps Attendance API</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 760px; margin: 40px auto; color: #1f2937; }}
    th {{ text-align: left; padding-top: 16px; }}
    td {{ padding: 2px 12px 2px 0; }}
  </style>
</head>
<body>
  <h1>LiveOps Attendance API</h1>
  <p>Geofenced attendance, absence-based payroll and weighted KPIs. v{version}</p>
  <p><a href="/docs">Swagger UI</a> · <a href="/health">Health</a></p>
  <p>Pick a company with the <code>X-Company-Id</code> header; without it the configured default is used.</p>
  <table>
{rows}  </table>
</body>
</html>"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}

/// Root handler: a plain HTML index of the API
pub async fn root_handler() -> impl IntoResponse {
    Html(landing_page())
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.settings.get_blob("health_check").await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "store": "connected",
                "service": "liveops-attendance",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "store": "unavailable",
                "error": e.to_string()
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_page_lists_every_group_once() {
        let page = landing_page();
        for group in ["Employees", "Attendance", "Payroll", "KPI", "Settings", "Shifts", "Leave"] {
            assert_eq!(page.matches(&format!("<th colspan=\"3\">{group}</th>")).count(), 1);
        }
        assert!(page.contains("/api/v1/kpi/ranking?year&amp;month"));
    }
}
