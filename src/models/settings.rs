// src/models/settings.rs
//
// Company-scoped configuration blobs. Each one is stored as JSON under a
// `<kind>_<company>` key and read back through `from_blob`, which falls back
// to the default value when the stored JSON is missing or malformed.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

pub const SETTINGS_VERSION: u32 = 1;

/// Decodes a stored blob, falling back to `T::default()` on absence or decode failure.
pub fn from_blob<T: DeserializeOwned + Default>(key: &str, blob: Option<Value>) -> T {
    match blob {
        None => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(key, error = %e, "Stored settings blob is malformed, using defaults");
            T::default()
        }),
    }
}

fn current_version() -> u32 {
    SETTINGS_VERSION
}

// ─── Office Geofence ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct OfficeGeofence {
    #[serde(default = "current_version")]
    pub version: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    /// Company-wide remote attendance.
    #[serde(default)]
    pub allow_remote: bool,
}

impl Default for OfficeGeofence {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            name: "Office".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            radius_meters: 100.0,
            allow_remote: false,
        }
    }
}

impl OfficeGeofence {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Location name is required".to_string()));
        }
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(AppError::Validation(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(AppError::Validation(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(AppError::Validation(
                "Radius must be a positive number of meters".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Weekly Holidays ──────────────────────────────────────────────────────────

/// Local day names used by the weekly holiday roster.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum DayName {
    #[serde(alias = "Monday")]
    Senin,
    #[serde(alias = "Tuesday")]
    Selasa,
    #[serde(alias = "Wednesday")]
    Rabu,
    #[serde(alias = "Thursday")]
    Kamis,
    #[serde(alias = "Friday")]
    Jumat,
    #[serde(alias = "Saturday")]
    Sabtu,
    #[serde(alias = "Sunday")]
    Minggu,
}

impl From<Weekday> for DayName {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayName::Senin,
            Weekday::Tue => DayName::Selasa,
            Weekday::Wed => DayName::Rabu,
            Weekday::Thu => DayName::Kamis,
            Weekday::Fri => DayName::Jumat,
            Weekday::Sat => DayName::Sabtu,
            Weekday::Sun => DayName::Minggu,
        }
    }
}

/// Who is off on which weekday, for the week starting at `week_of`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct WeeklyHolidayMap {
    #[serde(default = "current_version")]
    pub version: u32,
    /// ISO Monday of the week this roster applies to.
    pub week_of: NaiveDate,
    #[serde(default)]
    #[schema(value_type = BTreeMap<String, Vec<String>>)]
    pub days: BTreeMap<DayName, BTreeSet<String>>,
}

impl Default for WeeklyHolidayMap {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            week_of: NaiveDate::MIN,
            days: BTreeMap::new(),
        }
    }
}

/// Monday of the ISO week containing `date`.
pub fn iso_monday(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl WeeklyHolidayMap {
    pub fn empty_for(today: NaiveDate) -> Self {
        Self {
            version: SETTINGS_VERSION,
            week_of: iso_monday(today),
            days: BTreeMap::new(),
        }
    }

    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.week_of != iso_monday(today)
    }

    /// The stored roster if it belongs to the current week, an empty one otherwise.
    pub fn refreshed(self, today: NaiveDate) -> Self {
        if self.is_stale(today) {
            Self::empty_for(today)
        } else {
            self
        }
    }

    /// Whether the employee appears under any weekday.
    pub fn lists(&self, employee_name: &str) -> bool {
        self.days
            .values()
            .any(|names| names.iter().any(|n| same_name(n, employee_name)))
    }

    pub fn is_off(&self, employee_name: &str, day: DayName) -> bool {
        self.days
            .get(&day)
            .is_some_and(|names| names.iter().any(|n| same_name(n, employee_name)))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.days.values().flatten().any(|n| n.trim().is_empty()) {
            return Err(AppError::Validation(
                "Holiday roster contains an empty employee name".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── KPI System ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct KpiCriterion {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Percentage weight.
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct StandardWeights {
    pub attendance: f64,
    pub punctuality: f64,
    pub output: f64,
    pub revenue: f64,
}

impl Default for StandardWeights {
    fn default() -> Self {
        Self {
            attendance: 25.0,
            punctuality: 25.0,
            output: 25.0,
            revenue: 25.0,
        }
    }
}

/// Manual scores: `scores[year_month][employee_id][criterion_id]`.
pub type ManualScoreBook = BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>;

/// KPI configuration and manually entered scores for one company.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct KpiSystem {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub criteria: Vec<KpiCriterion>,
    #[serde(default)]
    pub weights: StandardWeights,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub scores: ManualScoreBook,
}

impl Default for KpiSystem {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            criteria: Vec::new(),
            weights: StandardWeights::default(),
            scores: ManualScoreBook::new(),
        }
    }
}

fn valid_weight(weight: f64) -> bool {
    weight.is_finite() && (0.0..=100.0).contains(&weight)
}

fn valid_score(score: f64) -> bool {
    score.is_finite() && (0.0..=100.0).contains(&score)
}

/// Checks a "YYYY-MM" period key.
pub fn parse_year_month(period: &str) -> Option<(i32, u32)> {
    let (year, month) = period.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).map(|_| (year, month))
}

pub fn year_month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

impl KpiSystem {
    pub fn validate(&self) -> AppResult<()> {
        let weights = [
            ("attendance", self.weights.attendance),
            ("punctuality", self.weights.punctuality),
            ("output", self.weights.output),
            ("revenue", self.weights.revenue),
        ];
        for (name, weight) in weights {
            if !valid_weight(weight) {
                return Err(AppError::Validation(format!(
                    "The {name} weight must be between 0 and 100"
                )));
            }
        }

        let mut seen = HashSet::new();
        for criterion in &self.criteria {
            if criterion.name.trim().is_empty() {
                return Err(AppError::Validation("Criterion name is required".to_string()));
            }
            if !valid_weight(criterion.weight) {
                return Err(AppError::Validation(format!(
                    "Weight of '{}' must be between 0 and 100",
                    criterion.name
                )));
            }
            if !criterion.id.is_empty() && !seen.insert(criterion.id.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate criterion id '{}'",
                    criterion.id
                )));
            }
        }
        Ok(())
    }

    /// Replaces the configuration part, keeping previously entered scores.
    pub fn with_configuration(mut self, criteria: Vec<KpiCriterion>, weights: StandardWeights) -> Self {
        self.version = SETTINGS_VERSION;
        self.criteria = criteria
            .into_iter()
            .map(|mut c| {
                if c.id.trim().is_empty() {
                    c.id = format!("crit_{}", uuid::Uuid::new_v4().simple());
                }
                c
            })
            .collect();
        self.weights = weights;
        self
    }

    /// Upserts one employee's manual scores for a period.
    pub fn set_scores(
        &mut self,
        period: &str,
        employee_id: &str,
        scores: BTreeMap<String, f64>,
    ) -> AppResult<()> {
        let (year, month) = parse_year_month(period)
            .ok_or_else(|| AppError::Validation(format!("Period '{period}' is not YYYY-MM")))?;
        for (criterion_id, score) in &scores {
            if !self.criteria.iter().any(|c| &c.id == criterion_id) {
                return Err(AppError::Validation(format!(
                    "Unknown criterion '{criterion_id}'"
                )));
            }
            if !valid_score(*score) {
                return Err(AppError::Validation(format!(
                    "Score for '{criterion_id}' must be between 0 and 100"
                )));
            }
        }

        self.scores
            .entry(year_month_key(year, month))
            .or_default()
            .entry(employee_id.to_string())
            .or_default()
            .extend(scores);
        Ok(())
    }

    pub fn manual_scores(&self, year: i32, month: u32, employee_id: &str) -> BTreeMap<String, f64> {
        self.scores
            .get(&year_month_key(year, month))
            .and_then(|by_employee| by_employee.get(employee_id))
            .cloned()
            .unwrap_or_default()
    }
}

// ─── Leave Ledger ─────────────────────────────────────────────────────────────

/// Manual correction to an employee's annual leave balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LeaveAdjustment {
    pub employee_id: String,
    pub year: i32,
    /// Positive grants extra days, negative takes days away.
    pub days: i32,
    #[serde(default)]
    pub note: String,
}
