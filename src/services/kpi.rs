// src/services/kpi.rs
//
// Weighted KPI scoring. Every component score sits in [0, 100]; a component
// the employee's role does not qualify for is left out of both the weighted
// sum and the weight total, and the sum is re-normalized over the weight
// actually used.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{
        AttendanceRecord, AttendanceStatus, Employee, KpiCriterion, OutputRecord, RevenueRecord,
        ShiftAssignment, StandardWeights,
    },
    services::{
        calendar::{DateWindow, calendar_month, output_window},
        shift::{ShiftCatalog, tally_punctuality},
    },
};

/// Monthly content items that earn a full output score.
pub const OUTPUT_QUOTA: f64 = 50.0;
/// Monthly GMV (smallest currency unit) that earns a full revenue score.
pub const REVENUE_TARGET: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KpiComponentKind {
    Attendance,
    Punctuality,
    Output,
    Revenue,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KpiComponent {
    pub kind: KpiComponentKind,
    /// Criterion id for manual components, the kind name otherwise.
    pub key: String,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KpiScore {
    pub employee_id: String,
    pub employee_name: String,
    pub components: Vec<KpiComponent>,
    pub weighted_sum: f64,
    pub total_weight_used: f64,
    pub final_score: f64,
    /// No applicable weight at all; the score defaulted to 0.
    pub misconfigured: bool,
}

/// Shift data for the punctuality component. Employees with no measured
/// clock-in against it are scored without punctuality.
#[derive(Debug, Clone, Copy)]
pub struct PunctualityInputs<'a> {
    pub assignments: &'a [ShiftAssignment],
    pub catalog: &'a ShiftCatalog,
    pub grace_minutes: u32,
}

/// Everything needed to score one period.
#[derive(Debug, Clone, Copy)]
pub struct KpiInputs<'a> {
    pub year: i32,
    pub month: u32,
    pub attendance: &'a [AttendanceRecord],
    pub outputs: &'a [OutputRecord],
    pub revenue: &'a [RevenueRecord],
    pub weights: &'a StandardWeights,
    pub criteria: &'a [KpiCriterion],
    pub punctuality: Option<PunctualityInputs<'a>>,
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn usable_weight(weight: f64) -> f64 {
    if weight.is_finite() { weight.max(0.0) } else { 0.0 }
}

pub fn attendance_score(records: &[AttendanceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    clamp_score(present as f64 / records.len() as f64 * 100.0)
}

pub fn output_score(output_count: u64) -> f64 {
    clamp_score((output_count as f64 / OUTPUT_QUOTA * 100.0).min(100.0))
}

pub fn revenue_score(total_revenue: i64) -> f64 {
    clamp_score((total_revenue as f64 / REVENUE_TARGET * 100.0).min(100.0))
}

#[derive(Default)]
struct Accumulator {
    components: Vec<KpiComponent>,
    weighted_sum: f64,
    total_weight_used: f64,
}

impl Accumulator {
    fn include(&mut self, kind: KpiComponentKind, key: &str, score: f64, weight: f64) {
        let score = clamp_score(score);
        let weight = usable_weight(weight);
        self.weighted_sum += score * (weight / 100.0);
        self.total_weight_used += weight;
        self.components.push(KpiComponent {
            kind,
            key: key.to_string(),
            score,
            weight,
        });
    }

    fn finish(self, employee: &Employee) -> KpiScore {
        let misconfigured = self.total_weight_used <= 0.0;
        let final_score = if misconfigured {
            0.0
        } else {
            clamp_score(self.weighted_sum * (100.0 / self.total_weight_used))
        };
        KpiScore {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            components: self.components,
            weighted_sum: self.weighted_sum,
            total_weight_used: self.total_weight_used,
            final_score,
            misconfigured,
        }
    }
}

trait EmployeeDated {
    fn owner(&self) -> &str;
    fn day(&self) -> NaiveDate;
}

impl EmployeeDated for AttendanceRecord {
    fn owner(&self) -> &str {
        &self.employee_id
    }
    fn day(&self) -> NaiveDate {
        self.date
    }
}

impl EmployeeDated for OutputRecord {
    fn owner(&self) -> &str {
        &self.employee_id
    }
    fn day(&self) -> NaiveDate {
        self.date
    }
}

impl EmployeeDated for RevenueRecord {
    fn owner(&self) -> &str {
        &self.employee_id
    }
    fn day(&self) -> NaiveDate {
        self.date
    }
}

fn in_window<'r, T: EmployeeDated>(
    records: &'r [T],
    employee_id: &'r str,
    window: Option<DateWindow>,
) -> impl Iterator<Item = &'r T> + 'r {
    records
        .iter()
        .filter(move |r| r.owner() == employee_id && window.is_some_and(|w| w.contains(r.day())))
}

/// Scores one employee for the period in `inputs`.
///
/// Attendance and revenue are taken over the calendar month, output over the
/// 26th–25th output window. Criteria without an entered score count as 0.
pub fn score_employee(
    employee: &Employee,
    inputs: &KpiInputs<'_>,
    manual_scores: &BTreeMap<String, f64>,
) -> KpiScore {
    let caps = employee.capabilities();
    let month = calendar_month(inputs.year, inputs.month);
    let mut acc = Accumulator::default();

    let attendance: Vec<AttendanceRecord> =
        in_window(inputs.attendance, &employee.id, month).cloned().collect();
    acc.include(
        KpiComponentKind::Attendance,
        "attendance",
        attendance_score(&attendance),
        inputs.weights.attendance,
    );

    // Only clock-ins on this employee's own assigned shifts are measured.
    let tally = inputs
        .punctuality
        .map(|p| tally_punctuality(&attendance, p.assignments, p.catalog, p.grace_minutes))
        .filter(|t| t.measured > 0);
    if let Some(tally) = tally {
        acc.include(
            KpiComponentKind::Punctuality,
            "punctuality",
            tally.score(),
            inputs.weights.punctuality,
        );
    }

    if caps.is_creator {
        let window = output_window(inputs.year, inputs.month);
        let count: u64 = in_window(inputs.outputs, &employee.id, window)
            .map(|r| u64::from(r.count))
            .sum();
        acc.include(
            KpiComponentKind::Output,
            "output",
            output_score(count),
            inputs.weights.output,
        );
    }

    if caps.is_host {
        let total: i64 = in_window(inputs.revenue, &employee.id, month)
            .fold(0i64, |sum, r| sum.saturating_add(r.amount));
        acc.include(
            KpiComponentKind::Revenue,
            "revenue",
            revenue_score(total),
            inputs.weights.revenue,
        );
    }

    for criterion in inputs.criteria {
        let score = manual_scores.get(&criterion.id).copied().unwrap_or(0.0);
        acc.include(KpiComponentKind::Manual, &criterion.id, score, criterion.weight);
    }

    acc.finish(employee)
}

/// Sorts descending by final score; ties keep their input order.
pub fn rank(mut scores: Vec<KpiScore>) -> Vec<KpiScore> {
    scores.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
    });
    scores
}
