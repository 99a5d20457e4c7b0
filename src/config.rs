use crate::errors::AppError;
use chrono::NaiveDate;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Company used when a request carries no `X-Company-Id` header.
    pub default_company_id: String,
    /// Absences before this date predate the attendance system and are never counted.
    pub attendance_cutover_date: NaiveDate,
    pub late_grace_minutes: u32,
    pub annual_leave_days: u32,
    pub location_poll_interval: Duration,
    /// A single poll that takes longer than this is treated as "no fix".
    pub location_fix_timeout: Duration,
    pub location_max_fix_age: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let cutover = env::var("ATTENDANCE_CUTOVER_DATE").unwrap_or_else(|_| "2025-01-01".to_string());
        let attendance_cutover_date = NaiveDate::parse_from_str(cutover.trim(), "%Y-%m-%d")
            .map_err(|_| {
                AppError::Config(format!(
                    "ATTENDANCE_CUTOVER_DATE must be YYYY-MM-DD, got '{cutover}'"
                ))
            })?;

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT", 3000)?,
            default_company_id: env::var("DEFAULT_COMPANY_ID")
                .unwrap_or_else(|_| "default".to_string()),
            attendance_cutover_date,
            late_grace_minutes: parse_var("LATE_GRACE_MINUTES", 0)?,
            annual_leave_days: parse_var("ANNUAL_LEAVE_DAYS", 12)?,
            location_poll_interval: Duration::from_secs(parse_var("LOCATION_POLL_SECS", 15)?),
            location_fix_timeout: Duration::from_secs(parse_var("LOCATION_FIX_TIMEOUT_SECS", 10)?),
            location_max_fix_age: Duration::from_secs(parse_var("LOCATION_MAX_AGE_SECS", 120)?),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            default_company_id: "default".to_string(),
            attendance_cutover_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
            late_grace_minutes: 0,
            annual_leave_days: 12,
            location_poll_interval: Duration::from_secs(15),
            location_fix_timeout: Duration::from_secs(10),
            location_max_fix_age: Duration::from_secs(120),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} must be a valid number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
